// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for startup content synchronization

mod support;

mod catalog_tests;
mod events_tests;
mod fetcher_tests;
mod flag_tests;
mod property_tests;
