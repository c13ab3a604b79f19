// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod env;
mod renderer;

pub(crate) use env::{TestEnv, assert_close};
pub(crate) use renderer::{DrawEvent, PixmapSink, RecordingSink};
