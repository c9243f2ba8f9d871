// Copyright 2026 the Votesync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data files and user input for votesync sessions.
//!
//! This crate is the `std` side of `votesync_core`: it reads statement and
//! transcript files from a [`DataLayout`](layout::DataLayout), exports the
//! statement list and vote records as JSON, and turns video URLs into
//! [`VideoId`](votesync_core::session::VideoId)s.
//!
//! Loading never fails outright. [`DataLayout::fetch_video_data`] collects
//! errors next to whatever it could read, and the caller hands
//! `statements` (possibly `None`) to
//! [`Session::complete_load`](votesync_core::session::Session::complete_load),
//! which applies an empty set in that case.
//!
//! [`DataLayout::fetch_video_data`]: layout::DataLayout::fetch_video_data

pub mod error;
pub mod layout;
pub mod statements;
pub mod transcript;
pub mod video;
