// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod adapter;
pub mod catalog;
pub mod columns;
pub mod forms;
pub mod ids;
pub mod inactive;
pub mod list_view;
pub mod model;
pub mod normalize;
pub mod page_source;
pub mod search;
pub mod sort;
pub mod state;

pub use adapter::*;
pub use catalog::*;
pub use columns::*;
pub use forms::*;
pub use ids::*;
pub use inactive::*;
pub use list_view::*;
pub use model::*;
pub use normalize::*;
pub use page_source::*;
pub use search::*;
pub use sort::*;
pub use state::*;
