use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;

/// Adapts a hyper body into a stream of data frames, which is what
/// streaming parsers such as `multer` consume. Trailers end the stream.
#[pin_project::pin_project]
pub struct BodyStream<B>(#[pin] B);

impl<B: hyper::body::Body<Data = Bytes>> futures_util::Stream for BodyStream<B> {
	type Item = Result<Bytes, B::Error>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		match self.project().0.poll_frame(cx) {
			Poll::Ready(Some(Ok(frame))) => Poll::Ready(frame.into_data().ok().map(Ok)),
			Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err))),
			Poll::Ready(None) => Poll::Ready(None),
			Poll::Pending => Poll::Pending,
		}
	}
}

pub trait BodyExt: hyper::body::Body + Sized {
	fn into_stream(self) -> BodyStream<Self>;
}

impl<B: hyper::body::Body> BodyExt for B {
	fn into_stream(self) -> BodyStream<Self> {
		BodyStream(self)
	}
}
