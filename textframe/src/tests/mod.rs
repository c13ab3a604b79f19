// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_attachments;
mod test_draw;
mod test_index;
mod test_line_breaking;
mod test_paragraph_style;
mod test_prerender;
mod test_query;
mod utils;
