// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame construction and rendering off the calling thread.

use core::fmt;
use core::ops::Range;
use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

use peniko::kurbo::Size;

use crate::cancel::CancellationFlag;
use crate::shape::Shaper;
use crate::{StyledString, TextFrame, TextFrameOptions};

/// The inputs of [`TextFrame::new`] for a [`Prerender`].
#[derive(Clone, Debug)]
pub struct PrerenderInput {
    /// The string to lay out.
    pub string: Arc<StyledString>,
    /// The range of the string to lay out.
    pub range: Range<usize>,
    /// The frame size.
    pub size: Size,
    /// The display scale.
    pub display_scale: Option<f64>,
    /// The layout options.
    pub options: TextFrameOptions,
}

impl PrerenderInput {
    /// Lays out all of `string` with the given size and options.
    pub fn new(string: Arc<StyledString>, size: Size, options: TextFrameOptions) -> Self {
        let range = 0..string.len();
        Self {
            string,
            range,
            size,
            display_scale: None,
            options,
        }
    }
}

/// A finished frame and whatever was rendered from it.
#[derive(Debug)]
pub struct Prerendered<R> {
    /// The frame.
    pub frame: TextFrame,
    /// The result of the render callback.
    pub output: R,
}

/// A frame being constructed and rendered on a background thread.
///
/// The consumer only waits for the result. Dropping a `Prerender` without waiting cancels the
/// work and detaches the thread.
pub struct Prerender<R> {
    handle: Option<JoinHandle<Option<Prerendered<R>>>>,
    cancel: Arc<CancellationFlag>,
}

impl<R> fmt::Debug for Prerender<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prerender")
            .field("finished", &self.is_finished())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl<R: Send + 'static> Prerender<R> {
    /// Starts constructing a frame from `input` on a new thread, then calls `render` with the
    /// frame on that thread.
    ///
    /// `render` receives the cancellation flag so that it can pass it on to
    /// [`TextFrame::draw`]. It is not called if construction was cancelled.
    pub fn spawn<F>(
        input: PrerenderInput,
        shaper: Arc<dyn Shaper + Send + Sync>,
        render: F,
    ) -> io::Result<Self>
    where
        F: FnOnce(&TextFrame, &CancellationFlag) -> R + Send + 'static,
    {
        let cancel = Arc::new(CancellationFlag::new());
        let flag = cancel.clone();
        let handle = Builder::new()
            .name("textframe-prerender".into())
            .spawn(move || {
                let frame = TextFrame::new(
                    input.string,
                    input.range,
                    input.size,
                    input.display_scale,
                    &input.options,
                    &*shaper,
                    Some(&flag),
                )?;
                if flag.is_cancelled() {
                    return None;
                }
                let output = render(&frame, &flag);
                if flag.is_cancelled() {
                    log::debug!("prerender cancelled after rendering");
                    return None;
                }
                Some(Prerendered { frame, output })
            })?;
        Ok(Self {
            handle: Some(handle),
            cancel,
        })
    }

    /// Blocks until the work is done. Returns `None` if it was cancelled.
    ///
    /// A panic on the background thread is resumed on the calling thread.
    pub fn wait(mut self) -> Option<Prerendered<R>> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

impl<R> Prerender<R> {
    /// Requests cancellation. [`wait`](Self::wait) then returns `None` unless the work already
    /// finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` if the background thread has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl<R> Drop for Prerender<R> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}
