mod school;

pub use self::school::*;
