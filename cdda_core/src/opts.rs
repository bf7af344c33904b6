/*!
# CDDA: Options
*/

use crate::MAX_TRACKS;



/// # FLAG: Read CD-Text.
const FLAG_CDTEXT: u8 = 0b0000_0001;

/// # FLAG: RAW PCM (instead of WAV).
const FLAG_RAW: u8 =    0b0000_0010;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_CDTEXT;

/// # Minimum Buffer Frames.
const BUFFER_MIN: u8 = 1;

/// # Maximum Buffer Frames.
const BUFFER_MAX: u8 = 64;

/// # Default Buffer Frames.
const BUFFER_DEFAULT: u8 = 32;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # CDDA Options.
///
/// This struct holds the disc-level options: the size of the read-ahead
/// buffer, whether or not to bother with CD-Text, the output format, and the
/// tracks to extract.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use cdda_core::CddaOptions;
///
/// let opts = CddaOptions::default()
///     .with_buffer_frames(8)
///     .with_track(3) // Order doesn't matter.
///     .with_track(2)
///     .with_raw(true);
///
/// assert_eq!(opts.buffer_frames(), 8);
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3]);
/// assert!(opts.raw());
/// ```
pub struct CddaOptions {
	buffer_frames: u8,
	flags: u8,
	tracks: u128,
}

impl Default for CddaOptions {
	fn default() -> Self {
		Self {
			buffer_frames: BUFFER_DEFAULT,
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl CddaOptions {
	#[must_use]
	/// # Buffer Frames.
	///
	/// Set the size of the read-ahead buffer, in frames. Larger buffers mean
	/// fewer (bigger) device reads.
	///
	/// Values are capped to `1..=64`, with a default of `32`.
	pub const fn with_buffer_frames(self, mut buffer_frames: u8) -> Self {
		if buffer_frames < BUFFER_MIN { buffer_frames = BUFFER_MIN; }
		else if BUFFER_MAX < buffer_frames { buffer_frames = BUFFER_MAX; }
		Self {
			buffer_frames,
			..self
		}
	}

	with_flag!(
		with_cdtext,
		FLAG_CDTEXT,
		"# Read CD-Text.",
		"",
		"When `true`, the disc's CD-Text (if any) is read and parsed.",
		"",
		"The default is `true`.",
	);

	with_flag!(
		with_raw,
		FLAG_RAW,
		"# Output Raw PCM.",
		"",
		"When `true`, tracks will be saved in raw PCM format. When `false`,",
		"they'll be saved as WAV files.",
		"",
		"The default is `false`.",
	);

	#[must_use]
	/// # Include Track.
	///
	/// Add a given track number to the extraction list. Numbers outside
	/// `1..=99` are ignored.
	pub const fn with_track(self, track: u8) -> Self {
		let tracks = self.tracks | track_to_bits(track);
		Self {
			tracks,
			..self
		}
	}
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl CddaOptions {
	get_flag!(cdtext, FLAG_CDTEXT, "Read CD-Text");
	get_flag!(raw, FLAG_RAW, "Output Raw PCM");

	#[must_use]
	/// # Buffer Frames.
	pub const fn buffer_frames(&self) -> u8 { self.buffer_frames }

	#[must_use]
	/// # Has Any Tracks?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track numbers, in order.
	pub const fn tracks(&self) -> CddaOptionsTracks {
		CddaOptionsTracks {
			set: self.tracks,
			pos: 1,
		}
	}
}



#[derive(Debug, Clone)]
/// # Option Tracks.
///
/// This iterator converts the `u128` flag back into individual `u8` track
/// numbers.
pub struct CddaOptionsTracks {
	set: u128,
	pos: u8,
}

impl Iterator for CddaOptionsTracks {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pos <= MAX_TRACKS {
			let idx = self.pos;
			self.pos += 1;
			if 0 != self.set & track_to_bits(idx) {
				return Some(idx);
			}
		}
		None
	}

	/// # Size Hint.
	///
	/// There will never be more than 99 tracks.
	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(usize::from(MAX_TRACKS + 1).saturating_sub(usize::from(self.pos))))
	}
}



/// # Track Number to Bitflag.
///
/// Audio CDs have at most 99 tracks, numbered from one, so every combination
/// fits in a `u128`. Out of range values are silently treated as zero.
const fn track_to_bits(idx: u8) -> u128 {
	if idx == 0 || MAX_TRACKS < idx { 0 }
	else { 1_u128 << idx }
}
