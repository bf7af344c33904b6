/*!
# CDDA: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
CDDA v", env!("CARGO_PKG_VERSION"), r"
Table of contents, CD-Text, and audio extraction
for audio CD device dumps.

USAGE:
    cdda [OPTIONS] -d <DIR>

DEVICE:
    -d, --dev <DIR>   A device dump directory containing the raw READ TOC
                      response (toc.bin), and optionally the raw CD-Text
                      response (cdtext.bin) and a raw audio image
                      (audio.raw) beginning at frame 150.

EXTRACTION:
    -t, --tracks <NUM(s),RNG>
                      Extract one or more tracks. Multiple tracks can be
                      separated by commas (2,3), specified as an inclusive
                      range (2-3), and/or given their own -t/--track
                      (-t 2 -t 3). [default: none; print the summary only]
    -o, --output <DIR>
                      Write extracted tracks to this directory.
                      [default: the current working directory]
    -b, --buffer <FRAMES>
                      The size of the frame read-ahead buffer.
                      [default: 32; range: 1..=64]
        --raw         Save raw PCM (.pcm) instead of WAV (.wav).

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -V, --version     Print version information to STDOUT and exit.
        --no-cdtext   Skip the CD-Text, even if the dump has it.
        --no-summary  Skip the disc summary.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum CddaError {
	/// # Device read error.
	CdRead,

	/// # Frame read failed (even one at a time).
	CdReadFrame(u32),

	/// # Malformed CD-Text response header.
	CdTextHeader,

	/// # CD-Text parsed, but not enough of it to be useful.
	///
	/// Not every disc has CD-Text; callers should simply look elsewhere.
	CdTextIncomplete,

	/// # CD-Text pack sequence gap (expected, found).
	CdTextSequence(u8, u8),

	/// # Invalid device (dump).
	Device(String),

	/// # Read past the end of the disc or track.
	ReadRange,

	/// # Malformed table of contents header.
	TocHeader,

	/// # Not enough table of contents records.
	TocTracks,

	/// # No Track.
	NoTrack(u8),

	/// # Data track.
	TrackData(u8),

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for CddaError {}

impl From<CddaError> for Msg {
	#[inline]
	fn from(src: CddaError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for CddaError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CdRead => f.write_str("Read error."),
			Self::CdReadFrame(n) => write!(f, "Unable to read frame {n}."),
			Self::CdTextHeader => f.write_str("Invalid CD-Text header."),
			Self::CdTextIncomplete => f.write_str("The CD-Text is missing or incomplete."),
			Self::CdTextSequence(a, b) => write!(f, "CD-Text pack sequence mismatch ({b} != {a})."),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::ReadRange => f.write_str("The read extends past the end of the disc."),
			Self::TocHeader => f.write_str("Invalid table of contents header."),
			Self::TocTracks => f.write_str("The table of contents has no usable tracks."),
			Self::NoTrack(n) => write!(f, "There is no track #{n} on this disc."),
			Self::TrackData(n) => write!(f, "Track #{n} is a data track."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("CDDA v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
