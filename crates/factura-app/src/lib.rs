// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod details;
pub mod editor;
pub mod error;
pub mod filter;
pub mod format;
pub mod forms;
pub mod gateway;
pub mod ids;
pub mod line_items;
pub mod model;
pub mod state;
pub mod store;
pub mod view;

pub use details::*;
pub use editor::*;
pub use error::*;
pub use filter::*;
pub use forms::*;
pub use gateway::*;
pub use ids::*;
pub use line_items::*;
pub use model::*;
pub use state::*;
pub use store::*;
pub use view::*;
