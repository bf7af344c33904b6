/*!
# CDDA: Table of Contents
*/

use crate::{
	CD_LEADOUT_LABEL,
	CddaError,
	DeviceReader,
	FRAMES_PER_MINUTE,
	FRAMES_PER_SECOND,
	MAX_TRACKS,
	ScsiCommand,
};
use dactyl::NiceU32;
use std::{
	fmt,
	ops::Range,
};



/// # Header Size.
const TOC_HEADER_SIZE: usize = 4;

/// # Track Record Size.
const TOC_TRACK_SIZE: usize = 8;

/// # Response Buffer Size.
///
/// The header plus room for every track and the lead-out.
pub(crate) const TOC_BUFFER_SIZE: usize = TOC_HEADER_SIZE + TOC_TRACK_SIZE * (MAX_TRACKS as usize + 1);

/// # Data Track Control Bit.
const CONTROL_DATA: u8 = 0b0000_0100;



#[derive(Debug, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # MSF.
///
/// A minute/second/frame timestamp, counted from the very start of the disc
/// (i.e. including the two-second lead-in).
pub struct Msf {
	/// # Minute.
	minute: u8,

	/// # Second.
	second: u8,

	/// # Frame.
	frame: u8,
}

impl fmt::Display for Msf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}.{:02}", self.minute, self.second, self.frame)
	}
}

impl Msf {
	#[must_use]
	/// # New.
	pub const fn new(minute: u8, second: u8, frame: u8) -> Self {
		Self { minute, second, frame }
	}

	#[must_use]
	/// # From Frames.
	///
	/// Convert an absolute frame number to MSF. This returns `None` if the
	/// minute would overflow.
	pub fn from_frames(frames: u32) -> Option<Self> {
		let minute = u8::try_from(frames.wrapping_div(FRAMES_PER_MINUTE)).ok()?;
		let rem = frames % FRAMES_PER_MINUTE;
		let second = u8::try_from(rem.wrapping_div(FRAMES_PER_SECOND)).ok()?;
		let frame = u8::try_from(rem % FRAMES_PER_SECOND).ok()?;
		Some(Self { minute, second, frame })
	}

	#[must_use]
	/// # Minute.
	pub const fn minute(self) -> u8 { self.minute }

	#[must_use]
	/// # Second.
	pub const fn second(self) -> u8 { self.second }

	#[must_use]
	/// # Frame.
	pub const fn frame(self) -> u8 { self.frame }

	#[must_use]
	/// # To Frames.
	///
	/// Return the absolute frame number.
	pub const fn to_frames(self) -> u32 {
		self.minute as u32 * FRAMES_PER_MINUTE +
		self.second as u32 * FRAMES_PER_SECOND +
		self.frame as u32
	}

	#[must_use]
	/// # To Seconds.
	///
	/// Return the absolute time in whole seconds.
	pub const fn to_seconds(self) -> u32 {
		self.minute as u32 * 60 + self.second as u32
	}
}



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # Track.
///
/// A single table of contents entry.
pub struct TocTrack {
	/// # Track Number.
	number: u8,

	/// # Data Track?
	data: bool,

	/// # Start.
	start: Msf,
}

impl TocTrack {
	/// # From Record.
	///
	/// The eight-byte layout is: reserved, ADR/control, track number,
	/// reserved, then a zero-padded MSF.
	const fn from_record(src: [u8; TOC_TRACK_SIZE]) -> Self {
		Self {
			number: src[2],
			data: 0 != src[1] & CONTROL_DATA,
			start: Msf::new(src[5], src[6], src[7]),
		}
	}

	#[must_use]
	/// # Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Data Track?
	pub const fn is_data(&self) -> bool { self.data }

	#[must_use]
	/// # Start.
	pub const fn start(&self) -> Msf { self.start }

	#[must_use]
	/// # Start Frame (Absolute).
	pub const fn start_frame(&self) -> u32 { self.start.to_frames() }
}



#[derive(Debug, Clone, Eq, Hash, PartialEq)]
/// # Table of Contents.
///
/// The parsed (and validated) track list of a disc.
pub struct Toc {
	/// # First Track Number.
	first_track: u8,

	/// # Last Track Number.
	last_track: u8,

	/// # Tracks.
	tracks: Vec<TocTrack>,

	/// # Lead-out.
	leadout: TocTrack,
}

impl fmt::Display for Toc {
	/// # Table Dump.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = "----------------------------------------------\n";

		f.write_str("##  START        FIRST     LAST   LENGTH\n")?;
		f.write_str(DIVIDER)?;

		let next = self.tracks.iter().skip(1).chain(std::iter::once(&self.leadout));
		for (t, n) in self.tracks.iter().zip(next) {
			let rng = t.start_frame()..n.start_frame().max(t.start_frame());
			let len = NiceU32::from(rng.end - rng.start);
			writeln!(
				f,
				"{:02}  {}  {:>7}  {:>7}  {:>7}{}",
				t.number,
				t.start,
				rng.start,
				rng.end.saturating_sub(1),
				len.as_str(),
				if t.data { "  DATA" } else { "" },
			)?;
		}

		writeln!(
			f,
			"{}  {}  {:>7}",
			CD_LEADOUT_LABEL,
			self.leadout.start,
			self.leadout.start_frame(),
		)?;
		f.write_str(DIVIDER)
	}
}

impl Toc {
	/// # Parse.
	///
	/// Parse a raw READ TOC response.
	///
	/// If the response was cut short, the track list is shortened to fit,
	/// with the last complete record serving as the lead-out.
	///
	/// ## Errors
	///
	/// This will return an error if the header is invalid, or fewer than two
	/// records are present.
	pub fn parse(raw: &[u8]) -> Result<Self, CddaError> {
		let [a, b, first, last, ..] = raw else {
			return Err(CddaError::TocHeader);
		};
		let (first, last) = (*first, *last);
		let data_len = usize::from(u16::from_be_bytes([*a, *b])) + 2;
		if data_len < TOC_HEADER_SIZE || last < first {
			return Err(CddaError::TocHeader);
		}

		// Clamp the track count to what we actually have.
		let fit = (data_len.min(raw.len()) - TOC_HEADER_SIZE).wrapping_div(TOC_TRACK_SIZE);
		let needed = usize::from(last - first) + 2;
		let last = if fit < needed {
			if fit < 2 { return Err(CddaError::TocTracks); }
			first + u8::try_from(fit - 2).map_err(|_| CddaError::TocTracks)?
		}
		else { last };

		let mut tracks: Vec<TocTrack> = raw[TOC_HEADER_SIZE..]
			.chunks_exact(TOC_TRACK_SIZE)
			.take(usize::from(last - first) + 2)
			.filter_map(|c| c.try_into().ok().map(TocTrack::from_record))
			.collect();
		let leadout = tracks.pop().ok_or(CddaError::TocTracks)?;

		Ok(Self {
			first_track: first,
			last_track: last,
			tracks,
			leadout,
		})
	}

	#[must_use]
	/// # First Track Number.
	pub const fn first_track(&self) -> u8 { self.first_track }

	#[must_use]
	/// # Last Track Number.
	pub const fn last_track(&self) -> u8 { self.last_track }

	#[must_use]
	/// # Number of Tracks.
	pub fn track_count(&self) -> u8 {
		u8::try_from(self.tracks.len()).unwrap_or(u8::MAX)
	}

	#[must_use]
	/// # Tracks.
	///
	/// Return the tracks, excluding the lead-out.
	pub fn tracks(&self) -> &[TocTrack] { &self.tracks }

	#[must_use]
	/// # Track.
	///
	/// Return the track numbered `num`, if any.
	pub fn track(&self, num: u8) -> Option<&TocTrack> {
		let idx = num.checked_sub(self.first_track)?;
		self.tracks.get(usize::from(idx))
	}

	#[must_use]
	/// # Lead-out.
	pub const fn leadout(&self) -> &TocTrack { &self.leadout }

	#[must_use]
	/// # Track Frames.
	///
	/// Return the absolute frame range for a given track, if it exists.
	pub fn track_frames(&self, num: u8) -> Option<Range<u32>> {
		let idx = usize::from(num.checked_sub(self.first_track)?);
		let start = self.tracks.get(idx)?.start_frame();
		let end = self.tracks.get(idx + 1).unwrap_or(&self.leadout).start_frame();
		Some(start..end.max(start))
	}

	#[must_use]
	/// # End Frame.
	///
	/// This is the (absolute) lead-out frame; reads must stop before it.
	pub const fn end_frame(&self) -> u32 { self.leadout.start_frame() }
}



/// # Read Table of Contents.
///
/// Issue a READ TOC command into `buf` and parse the result.
///
/// The buffer only needs to be big enough for the header and the records
/// of interest; the track list is shortened to whatever fits.
///
/// ## Errors
///
/// This will return an error if the read fails or the response is invalid.
pub fn read_table_of_contents<D: DeviceReader>(dev: &mut D, buf: &mut [u8])
-> Result<Toc, CddaError> {
	dev.read_scsi_command(ScsiCommand::ReadToc, buf)?;
	Toc::parse(buf)
}



#[cfg(test)]
pub(crate) mod test {
	use super::*;

	/// # Build TOC Response.
	///
	/// Build a raw response from `(absolute start frame, data)` pairs and the
	/// lead-out frame.
	pub(crate) fn toc_response(tracks: &[(u32, bool)], leadout: u32) -> Vec<u8> {
		let len = u16::try_from(2 + TOC_TRACK_SIZE * (tracks.len() + 1))
			.expect("Too many tracks.");
		let last = u8::try_from(tracks.len()).expect("Too many tracks.");

		let mut out = Vec::new();
		out.extend_from_slice(&len.to_be_bytes());
		out.push(1);
		out.push(last);

		for (num, (start, data)) in (1..).zip(tracks.iter().copied())
			.chain(std::iter::once((0xAA, (leadout, false))))
		{
			let msf = Msf::from_frames(start).expect("Bad MSF.");
			out.extend_from_slice(&[
				0,
				0x10 | if data { CONTROL_DATA } else { 0 },
				num,
				0,
				0,
				msf.minute(),
				msf.second(),
				msf.frame(),
			]);
		}

		out
	}

	#[test]
	fn t_msf() {
		let msf = Msf::new(3, 17, 5);
		assert_eq!(msf.to_frames(), 3 * 4500 + 17 * 75 + 5);
		assert_eq!(msf.to_seconds(), 197);
		assert_eq!(msf.to_string(), "03:17.05");
		assert_eq!(Msf::from_frames(msf.to_frames()), Some(msf));

		assert_eq!(Msf::from_frames(150), Some(Msf::new(0, 2, 0)));
		assert_eq!(Msf::from_frames(0), Some(Msf::default()));
		assert_eq!(Msf::from_frames(u32::MAX), None, "Minute overflow.");

		assert!(Msf::new(0, 2, 0) < Msf::new(0, 2, 1));
		assert!(Msf::new(1, 0, 0) > Msf::new(0, 59, 74));
	}

	#[test]
	fn t_parse() {
		let raw = toc_response(&[(150, false), (14_775, false), (25_000, true)], 33_825);
		let toc = Toc::parse(&raw).expect("TOC failed.");
		assert_eq!(toc.first_track(), 1);
		assert_eq!(toc.last_track(), 3);
		assert_eq!(toc.track_count(), 3);
		assert_eq!(toc.tracks().len(), 3);

		let t = toc.track(1).expect("Missing track.");
		assert_eq!(t.number(), 1);
		assert_eq!(t.start(), Msf::new(0, 2, 0));
		assert!(! t.is_data());

		let t = toc.track(3).expect("Missing track.");
		assert!(t.is_data(), "Track three should be data.");

		assert!(toc.track(0).is_none());
		assert!(toc.track(4).is_none());

		assert_eq!(toc.leadout().number(), 0xAA);
		assert_eq!(toc.end_frame(), 33_825);

		assert_eq!(toc.track_frames(1), Some(150..14_775));
		assert_eq!(toc.track_frames(2), Some(14_775..25_000));
		assert_eq!(toc.track_frames(3), Some(25_000..33_825));
		assert_eq!(toc.track_frames(4), None);

		// A bigger buffer doesn't change anything.
		let mut big = raw.clone();
		big.resize(TOC_BUFFER_SIZE, 0);
		assert_eq!(Toc::parse(&big), Ok(toc));
	}

	#[test]
	fn t_parse_header() {
		assert_eq!(Toc::parse(&[]), Err(CddaError::TocHeader));
		assert_eq!(Toc::parse(&[0, 18, 1]), Err(CddaError::TocHeader));

		// Data length too small.
		let mut raw = toc_response(&[(150, false)], 1000);
		raw[0] = 0;
		raw[1] = 1;
		assert_eq!(Toc::parse(&raw), Err(CddaError::TocHeader));

		// Backward tracks.
		let mut raw = toc_response(&[(150, false)], 1000);
		raw[2] = 2;
		raw[3] = 1;
		assert_eq!(Toc::parse(&raw), Err(CddaError::TocHeader));

		// Header only.
		assert_eq!(Toc::parse(&[0, 2, 1, 1]), Err(CddaError::TocTracks));
	}

	#[test]
	fn t_parse_clamp() {
		let raw = toc_response(&[(150, false), (1000, false), (2000, false)], 3000);

		// Chop off the lead-out; track three takes its place.
		let toc = Toc::parse(&raw[..raw.len() - TOC_TRACK_SIZE]).expect("TOC failed.");
		assert_eq!(toc.last_track(), 2);
		assert_eq!(toc.tracks().len(), 2);
		assert_eq!(toc.end_frame(), 2000);

		// A partial record doesn't count.
		let toc = Toc::parse(&raw[..raw.len() - 1]).expect("TOC failed.");
		assert_eq!(toc.last_track(), 2);

		// Just one track and the lead-out.
		let toc = Toc::parse(&raw[..TOC_HEADER_SIZE + TOC_TRACK_SIZE * 2]).expect("TOC failed.");
		assert_eq!(toc.last_track(), 1);
		assert_eq!(toc.track_frames(1), Some(150..1000));

		// Not enough for that.
		assert_eq!(
			Toc::parse(&raw[..TOC_HEADER_SIZE + TOC_TRACK_SIZE * 2 - 1]),
			Err(CddaError::TocTracks),
		);

		// The header's data length is respected too.
		let mut short = raw.clone();
		short[1] = u8::try_from(2 + TOC_TRACK_SIZE * 3).expect("Bad length.");
		let toc = Toc::parse(&short).expect("TOC failed.");
		assert_eq!(toc.last_track(), 2);
	}

	#[test]
	fn t_read_toc() {
		/// # Mock Device.
		struct Mock(Vec<u8>);

		impl DeviceReader for Mock {
			fn read_scsi_command(&mut self, command: ScsiCommand, buf: &mut [u8])
			-> Result<(), CddaError> {
				assert_eq!(command, ScsiCommand::ReadToc, "Wrong command.");
				let len = self.0.len().min(buf.len());
				buf[..len].copy_from_slice(&self.0[..len]);
				Ok(())
			}

			fn read_frames_raw(&mut self, _first: u32, _count: u32, _buf: &mut [u8])
			-> Result<(), CddaError> {
				Err(CddaError::CdRead)
			}
		}

		let mut dev = Mock(toc_response(&[(150, false), (1000, false), (2000, false)], 3000));
		let mut buf = [0_u8; TOC_BUFFER_SIZE];
		let toc = read_table_of_contents(&mut dev, &mut buf).expect("TOC failed.");
		assert_eq!(toc.last_track(), 3);

		// A buffer too small for everything.
		let mut buf = [0_u8; TOC_HEADER_SIZE + TOC_TRACK_SIZE * 3];
		let toc = read_table_of_contents(&mut dev, &mut buf).expect("TOC failed.");
		assert_eq!(toc.last_track(), 2, "The track list should be clamped.");
		assert_eq!(toc.end_frame(), 2000);
	}

	#[test]
	fn t_display() {
		let raw = toc_response(&[(150, false), (14_775, true)], 33_825);
		let toc = Toc::parse(&raw).expect("TOC failed.");
		let out = toc.to_string();
		let mut lines = out.lines().skip(2);
		assert_eq!(lines.next(), Some("01  00:02.00      150    14774   14,625"));
		assert_eq!(lines.next(), Some("02  03:17.00    14775    33824   19,050  DATA"));
		assert_eq!(lines.next(), Some("AA  07:31.00    33825"));
	}
}
