/*!
# Potluck

A shared "who brings what" list, built in Rust, that uses a spreadsheet as its database.

## Overview

People add their name, the item they bring, a quantity and a note. The list
is shown grouped by item and kept in sync with the spreadsheet: the sheet's
published CSV export is re-read on a timer and merged into what is already
on screen, and new entries are appended through a form endpoint of the sheet.

## Architecture

Data flows one way:

```text
CSV text -> loader::decode -> merge::reconcile (with the current list) -> list
list -> grouping::project -> view
```

Submissions go the other way: form -> `SheetBackend::append` -> optimistic
insert at the top of the list -> delayed re-read through the same pipeline.

### Core
- **record**: `Record` and `Submission`, fingerprints, timestamp parsing
- **loader**: CSV decoding, tolerant of quoted fields and embedded commas
- **merge**: reconciliation of a fresh snapshot with the current list
- **collate**: French ordering of item names
- **grouping**: items with their contributors, for display

### Sync
- **remote**: the spreadsheet boundary (`SheetBackend`) and its HTTP client
- **sync**: `SyncController`, which owns the list, the form and the status flags
- **config**: endpoint URLs and timings
- **error**: `SyncError`

### Presentation
- **view**: `ListView` skins (plain text, HTML)
- **app**: axum front-end (feature `web`)

## Design Highlights

- Records are deduplicated by a fingerprint of name, item, qty and note;
  timestamps are left out because the sheet may rewrite them
- The sheet is authoritative, but local entries it has not published yet survive a refresh
- Background refreshes are skipped while a submission is in flight
- One core, several skins: the web page and the terminal share the same controller
*/

pub mod collate;
pub mod config;
pub mod error;
pub mod grouping;
pub mod loader;
pub mod merge;
pub mod record;
pub mod remote;
pub mod sync;
pub mod view;

#[cfg(feature = "web")]
pub mod app;

pub use config::Config;
pub use error::SyncError;
pub use grouping::{Contributor, ItemGroup, project};
pub use loader::decode;
pub use merge::reconcile;
pub use record::{Record, Submission, fingerprint};
pub use remote::{HttpSheet, SheetBackend};
pub use sync::{Snapshot, SyncController};
