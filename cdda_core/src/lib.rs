/*!
# CDDA: Library

This crate holds the algorithmic core of an audio CD file system: CD-Text
parsing and cleanup, table of contents validation, FreeDB disc IDs, and
windowed raw audio reads.

All device access goes through the [`DeviceReader`] trait, so the same code
works with a real drive, a dump on disk, or a mock.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod cddb;
mod cdtext;
mod device;
mod disc;
mod error;
mod frames;
mod opts;
mod pack;
mod text;
mod toc;

pub use cddb::{
	Cddb,
	compute_cddb_disc_id,
};
pub use cdtext::{
	CdText,
	CDTextKind,
	read_cdtext,
};
pub use device::{
	DeviceReader,
	DumpDevice,
	ScsiCommand,
};
pub use disc::Disc;
pub use error::CddaError;
pub use frames::{
	FrameCache,
	read_cdda_data,
	read_frames,
};
pub use opts::{
	CddaOptions,
	CddaOptionsTracks,
};
pub use pack::{
	PackField,
	PackParser,
};
pub use text::{
	capitalize_string,
	CaseCheck,
	cut_string,
	find_string,
	sanitize_string,
	to_utf8,
};
pub use toc::{
	Msf,
	read_table_of_contents,
	Toc,
	TocTrack,
};



/// # Bytes Per Sample.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Samples per Frame.
pub const SAMPLES_PER_FRAME: u16 = 588;

/// # Bytes Per Frame.
///
/// This is the number of bytes in one raw CDDA frame (sector).
pub const BYTES_PER_FRAME: u16 = SAMPLES_PER_FRAME * BYTES_PER_SAMPLE;

/// # Frames Per Second.
pub const FRAMES_PER_SECOND: u32 = 75;

/// # Frames Per Minute.
pub const FRAMES_PER_MINUTE: u32 = FRAMES_PER_SECOND * 60;

/// # Number of lead-in frames.
///
/// All discs have a 2-second region at the start before any data. MSF
/// addresses include it; the raw audio image of a [`DumpDevice`] does not.
pub const CD_LEADIN: u32 = 150;

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Maximum Tracks.
///
/// Audio CDs are limited to 99 tracks.
pub const MAX_TRACKS: u8 = 99;

/// # Wave Spec.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
