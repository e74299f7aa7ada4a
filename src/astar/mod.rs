// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod search;

pub use error::SearchError;
pub use search::{shortest_path, shortest_path_between};
