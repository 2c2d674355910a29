// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod backup;
pub mod calc;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod dates;
pub mod db;
pub mod error;
pub mod income;
pub mod models;
pub mod notify;
pub mod recurring;
pub mod seed;
pub mod store;
pub mod utils;

pub use error::{Error, Result};
