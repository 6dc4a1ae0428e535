//! Caller-supplied continuations

use std::fmt;

use serde_json::Value;

/// A boxed continuation receiving a payload or an error value
pub type Callback = Box<dyn FnOnce(Value)>;

/// A boxed continuation that may be invoked any number of times
pub type RepeatingCallback = Box<dyn FnMut(Value)>;

/// A value the caller passed where a callback was expected
///
/// Host bindings receive untyped values and cannot rule out non-callables at
/// compile time. They hand those over as [`Handler::NotCallable`] so the client
/// refuses the call with the same diagnostics as any other invalid argument.
pub enum Handler {
    /// Invocable continuation
    Callable(Callback),
    /// Invocable continuation that accepts every answer of a kept call
    Repeating(RepeatingCallback),
    /// Anything else, described by its host type name
    NotCallable(String),
}

impl Handler {
    /// Wrap a closure
    pub fn new(callback: impl FnOnce(Value) + 'static) -> Self {
        Self::Callable(Box::new(callback))
    }

    /// Wrap a closure that can take more than one answer
    pub fn repeating(callback: impl FnMut(Value) + 'static) -> Self {
        Self::Repeating(Box::new(callback))
    }

    /// A continuation that ignores its argument
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// A non-callable value of host type `kind`
    pub fn not_callable(kind: impl Into<String>) -> Self {
        Self::NotCallable(kind.into())
    }

    /// Whether the handler can be invoked
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_) | Self::Repeating(_))
    }

    /// Unwrap the continuation, if any
    pub fn into_callback(self) -> Option<Callback> {
        match self {
            Self::Callable(callback) => Some(callback),
            Self::Repeating(mut callback) => Some(Box::new(move |value| callback(value))),
            Self::NotCallable(_) => None,
        }
    }

    /// Unwrap the continuation for a call answered any number of times
    ///
    /// A one-shot continuation only sees the first answer.
    pub fn into_repeating(self) -> Option<RepeatingCallback> {
        match self {
            Self::Callable(callback) => {
                let mut callback = Some(callback);
                Some(Box::new(move |value| {
                    if let Some(callback) = callback.take() {
                        callback(value);
                    }
                }))
            }
            Self::Repeating(callback) => Some(callback),
            Self::NotCallable(_) => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable"),
            Self::Repeating(_) => f.write_str("Repeating"),
            Self::NotCallable(kind) => f.debug_tuple("NotCallable").field(kind).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    #[test]
    fn callable_invokes_closure() {
        let hit = Rc::new(Cell::new(false));
        let flag = Rc::clone(&hit);
        let handler = Handler::new(move |v: Value| flag.set(v == json!(1)));
        assert!(handler.is_callable());

        let callback = handler.into_callback().unwrap();
        callback(json!(1));
        assert!(hit.get());
    }

    #[test]
    fn not_callable_has_no_callback() {
        let handler = Handler::not_callable("string");
        assert!(!handler.is_callable());
        assert_eq!(format!("{handler:?}"), "NotCallable(\"string\")");
        assert!(handler.into_callback().is_none());
        assert!(Handler::not_callable("number").into_repeating().is_none());
    }

    #[test]
    fn repeating_sees_every_answer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handler = Handler::repeating(move |v| sink.borrow_mut().push(v));
        assert!(handler.is_callable());

        let mut callback = handler.into_repeating().unwrap();
        callback(json!(1));
        callback(json!(2));
        assert_eq!(*seen.borrow(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn one_shot_as_repeating_sees_first_answer() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut callback = Handler::new(move |v| sink.borrow_mut().push(v))
            .into_repeating()
            .unwrap();
        callback(json!("ack"));
        callback(json!("update"));
        assert_eq!(*seen.borrow(), vec![json!("ack")]);
    }
}
