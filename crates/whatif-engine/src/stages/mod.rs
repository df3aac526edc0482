// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Stage logic shared by every analyst. Template functions are pure; the
//! `*_with_model` functions make exactly one model call and return a
//! `StageError` the analyst turns into a fallback.

pub mod domains;
pub mod impacts;
pub mod parser;
pub mod report;
pub mod ripple;
pub mod severity;
