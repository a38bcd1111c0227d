//! Lazy composition of stream stages.
//!
//! A stage takes one stream and returns another. Stages never run ahead on
//! their own: each item requested from the outermost stream pulls through
//! the chain only what it needs. Dropping the outer stream drops every stage
//! and the source with it.
//!
//! # Example
//! ```
//! use futures::executor::block_on;
//! use futures::stream::{self, StreamExt};
//! use sseflow::error::StreamError;
//! use sseflow::pipeline::Pipeline;
//! use sseflow::stages::{chars, upper};
//!
//! let source = stream::iter(vec![Ok::<_, StreamError>("ab".to_string()), Ok("c".to_string())]);
//! let out: Vec<_> = block_on(
//!     Pipeline::new(source)
//!         .pipe(chars)
//!         .pipe(upper)
//!         .into_stream()
//!         .map(Result::unwrap)
//!         .collect(),
//! );
//! assert_eq!(out, vec!["A", "B", "C"]);
//! ```

use futures::stream::{BoxStream, Stream, StreamExt};

/// One step of a pipeline.
///
/// Implemented for every `FnOnce(S) -> impl Stream`, so plain functions like
/// [`crate::stages::chars`] and closures are stages.
pub trait Stage<S: Stream> {
    type Output: Stream;

    fn apply(self, input: S) -> Self::Output;
}

impl<S, F, O> Stage<S> for F
where
    S: Stream,
    F: FnOnce(S) -> O,
    O: Stream,
{
    type Output = O;

    fn apply(self, input: S) -> O {
        self(input)
    }
}

/// Two stages run back to back. Built with [`chain`].
#[derive(Debug, Clone, Copy)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<S, A, B> Stage<S> for Chain<A, B>
where
    S: Stream,
    A: Stage<S>,
    B: Stage<A::Output>,
{
    type Output = B::Output;

    fn apply(self, input: S) -> Self::Output {
        self.second.apply(self.first.apply(input))
    }
}

/// Compose two stages into one.
///
/// `chain(chain(a, b), c)` and `chain(a, chain(b, c))` produce the same stream.
pub fn chain<A, B>(first: A, second: B) -> Chain<A, B> {
    Chain { first, second }
}

/// Builder for a statically typed chain of stages over a source stream.
#[derive(Debug)]
pub struct Pipeline<S> {
    stream: S,
}

impl<S: Stream> Pipeline<S> {
    pub fn new(source: S) -> Self {
        Self { stream: source }
    }

    /// Append a stage.
    pub fn pipe<T>(self, stage: T) -> Pipeline<T::Output>
    where
        T: Stage<S>,
    {
        Pipeline {
            stream: stage.apply(self.stream),
        }
    }

    pub fn into_stream(self) -> S {
        self.stream
    }
}

/// A type-erased stage over a homogeneous item type.
pub type BoxStage<'a, T> = Box<dyn FnOnce(BoxStream<'a, T>) -> BoxStream<'a, T> + Send + 'a>;

/// Box a stage so it can be stored in a runtime-ordered list.
pub fn boxed_stage<'a, T, F, O>(stage: F) -> BoxStage<'a, T>
where
    T: 'a,
    F: FnOnce(BoxStream<'a, T>) -> O + Send + 'a,
    O: Stream<Item = T> + Send + 'a,
{
    Box::new(move |input| stage(input).boxed())
}

/// Apply a list of stages in order.
///
/// With no stages the source is returned unchanged.
pub fn compose<'a, T>(source: BoxStream<'a, T>, stages: Vec<BoxStage<'a, T>>) -> BoxStream<'a, T> {
    stages.into_iter().fold(source, |stream, stage| stage(stream))
}
