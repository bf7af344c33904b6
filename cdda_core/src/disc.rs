/*!
# CDDA: Disc
*/

use crate::{
	BYTES_PER_FRAME,
	Cddb,
	CddaError,
	CddaOptions,
	CdText,
	DeviceReader,
	FrameCache,
	read_cdda_data,
	read_cdtext,
	read_table_of_contents,
	Toc,
	toc::TOC_BUFFER_SIZE,
	WAVE_SPEC,
};
use fyi_msg::Msg;
use hound::WavWriter;
use std::{
	fmt,
	io::{
		Cursor,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug)]
/// # Disc.
///
/// A loaded and parsed compact disc: the table of contents, the CDDB ID,
/// and the CD-Text (if any), along with the device and a read-ahead cache
/// for getting at the audio.
pub struct Disc<D> {
	/// # Device.
	dev: D,

	/// # Table of Contents.
	toc: Toc,

	/// # CDDB ID.
	cddb: Cddb,

	/// # CD-Text.
	cdtext: Option<CdText>,

	/// # Frame Cache.
	cache: FrameCache,

	/// # Raw PCM Output.
	raw: bool,
}

impl<D> fmt::Display for Disc<D> {
	/// # Summarize the Disc.
	///
	/// This prints the disc identifiers and text followed by the table of
	/// contents.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// A few key/value pairs.
		let mut kv: Vec<(&str, String)> = vec![("CDDB:", self.cddb.to_string())];
		if let Some(text) = self.cdtext.as_ref() {
			for (k, v) in [
				("Album:", text.album()),
				("Artist:", text.artist()),
				("Genre:", text.genre()),
				("Message:", text.message()),
			] {
				if let Some(v) = v { kv.push((k, v.to_owned())); }
			}
			if text.is_double_byte() {
				kv.push(("Encoding:", String::from("Double-byte (undecoded)")));
			}
		}

		let col_max: usize = kv.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
		for (k, v) in kv {
			writeln!(f, "{k:col_max$} {v}")?;
		}

		writeln!(f)?;
		fmt::Display::fmt(&self.toc, f)?;

		// The track names.
		if self.cdtext.is_some() {
			writeln!(f)?;
			for t in self.toc.tracks() {
				let num = t.number();
				if let Some(title) = self.track_title(num) {
					write!(f, "{num:02}  {title}")?;
					if let Some(artist) = self.cdtext.as_ref().and_then(|c| c.track_artist(num)) {
						write!(f, " ({artist})")?;
					}
					writeln!(f)?;
				}
			}
		}

		Ok(())
	}
}

impl<D: DeviceReader> Disc<D> {
	/// # New.
	///
	/// Read the table of contents and (optionally) the CD-Text from the
	/// device.
	///
	/// Problems with the CD-Text are not fatal; the disc is simply treated
	/// as having none.
	///
	/// ## Errors
	///
	/// This will return an error if the table of contents cannot be read or
	/// parsed.
	pub fn new(mut dev: D, opts: &CddaOptions) -> Result<Self, CddaError> {
		let mut buf = vec![0_u8; TOC_BUFFER_SIZE];
		let toc = read_table_of_contents(&mut dev, &mut buf)?;
		let cddb = Cddb::from(&toc);

		let cdtext =
			if opts.cdtext() {
				match read_cdtext(&mut dev) {
					Ok(text) => Some(text),
					Err(e) if no_cdtext(&e) => None,
					Err(e) => {
						Msg::warning(format!("Skipping CD-Text: {e}")).eprint();
						None
					},
				}
			}
			else { None };

		Ok(Self {
			dev,
			toc,
			cddb,
			cdtext,
			cache: FrameCache::new(u32::from(opts.buffer_frames())),
			raw: opts.raw(),
		})
	}
}

impl<D> Disc<D> {
	#[must_use]
	/// # Table of Contents.
	pub const fn toc(&self) -> &Toc { &self.toc }

	#[must_use]
	/// # CDDB ID.
	pub const fn cddb_id(&self) -> Cddb { self.cddb }

	#[must_use]
	/// # CD-Text.
	pub const fn cdtext(&self) -> Option<&CdText> { self.cdtext.as_ref() }

	#[must_use]
	/// # Track Title.
	pub fn track_title(&self, track: u8) -> Option<&str> {
		self.cdtext.as_ref()?.title(track)
	}

	#[must_use]
	/// # Track Artist.
	///
	/// Return the track's own artist, or failing that, the disc artist.
	pub fn track_artist(&self, track: u8) -> Option<&str> {
		let text = self.cdtext.as_ref()?;
		text.track_artist(track).or_else(|| text.artist())
	}

	/// # Track Length.
	///
	/// Return the length of an audio track in bytes.
	///
	/// ## Errors
	///
	/// This will return an error if the track does not exist or holds data.
	pub fn track_len(&self, track: u8) -> Result<u64, CddaError> {
		let rng = self.audio_frames(track)?;
		Ok(u64::from(rng.end - rng.start) * u64::from(BYTES_PER_FRAME))
	}

	/// # Audio Frames.
	///
	/// Return the absolute frame range of an audio track.
	fn audio_frames(&self, track: u8) -> Result<std::ops::Range<u32>, CddaError> {
		let t = self.toc.track(track).ok_or(CddaError::NoTrack(track))?;
		if t.is_data() { return Err(CddaError::TrackData(track)); }
		self.toc.track_frames(track).ok_or(CddaError::NoTrack(track))
	}
}

impl<D: DeviceReader> Disc<D> {
	/// # Read.
	///
	/// Fill `dst` with the audio bytes of `track` starting `pos` bytes into
	/// it.
	///
	/// ## Errors
	///
	/// This will return an error if the track does not exist or holds data,
	/// if the read runs past the end of the track, or if the device fails.
	pub fn read(&mut self, track: u8, pos: u64, dst: &mut [u8])
	-> Result<(), CddaError> {
		let rng = self.audio_frames(track)?;
		let offset = (u64::from(rng.start) * u64::from(BYTES_PER_FRAME))
			.checked_add(pos)
			.ok_or(CddaError::ReadRange)?;

		read_cdda_data(&mut self.dev, rng.end, offset, dst, &mut self.cache)
	}

	/// # Extract Track.
	///
	/// Save an audio track to `dir` as `NN.wav`, or `NN.pcm` if raw output
	/// was requested. Existing files are replaced.
	///
	/// ## Errors
	///
	/// This will return an error if the track cannot be read or the file
	/// cannot be written.
	pub fn extract<P>(&mut self, track: u8, dir: P) -> Result<PathBuf, CddaError>
	where P: AsRef<Path> {
		let len = self.track_len(track)?;
		let dst = dir.as_ref().join(format!(
			"{track:02}.{}",
			if self.raw { "pcm" } else { "wav" },
		));

		let size = usize::try_from(len).map_err(|_| CddaError::ReadRange)?;
		let mut data = vec![0_u8; size];
		let chunk = usize::try_from(self.cache.frames()).map_err(|_| CddaError::ReadRange)? *
			usize::from(BYTES_PER_FRAME);
		let mut pos = 0;
		for part in data.chunks_mut(chunk) {
			self.read(track, pos, part)?;
			pos += part.len() as u64;
		}

		if ! self.raw { data = wav(&data).ok_or_else(|| write_err(&dst))?; }
		write_atomic(&dst, &data).ok_or_else(|| write_err(&dst))?;
		Ok(dst)
	}
}



/// # WAV-ify.
///
/// Wrap 16-bit stereo PCM in a WAV container.
fn wav(pcm: &[u8]) -> Option<Vec<u8>> {
	let samples = u32::try_from(pcm.len().wrapping_div(2)).ok()?;
	let mut buf = Cursor::new(Vec::with_capacity(pcm.len() + 44));
	let mut wav = WavWriter::new(&mut buf, WAVE_SPEC).ok()?;

	// Hound counts left and right separately.
	{
		let mut writer = wav.get_i16_writer(samples);
		for pair in pcm.chunks_exact(2) {
			writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]));
		}
		writer.flush().ok()?;
	}

	wav.finalize().ok()?;
	Some(buf.into_inner())
}

/// # No CD-Text?
///
/// Discs without CD-Text either fail the read or return nothing useful.
/// Neither is worth mentioning.
const fn no_cdtext(err: &CddaError) -> bool {
	matches!(err, CddaError::CdRead | CddaError::CdTextIncomplete)
}

/// # Write Atomic.
///
/// Write the data to a temporary file in the destination directory, then
/// move it into place.
fn write_atomic(dst: &Path, data: &[u8]) -> Option<()> {
	let dir = dst.parent().filter(|p| p.is_dir())?;
	let mut file = tempfile::NamedTempFile::new_in(dir).ok()?;
	file.write_all(data).ok()?;
	file.flush().ok()?;
	file.persist(dst).ok()?;
	Some(())
}

/// # Write Error.
fn write_err(dst: &Path) -> CddaError {
	CddaError::Write(dst.to_string_lossy().into_owned())
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		cdtext::test::abbey_road,
		DumpDevice,
		toc::test::toc_response,
	};

	/// # Frame Size.
	const FRAME: usize = BYTES_PER_FRAME as usize;

	/// # Dump Fixture.
	///
	/// Two audio tracks (10 and 15 frames) and a data track (25 frames), with
	/// each audio frame filled with its index (from zero).
	fn dump(cdtext: bool) -> tempfile::TempDir {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		std::fs::write(
			dir.path().join("toc.bin"),
			toc_response(&[(150, false), (160, false), (175, true)], 200),
		).expect("Write failed.");

		if cdtext {
			std::fs::write(dir.path().join("cdtext.bin"), abbey_road())
				.expect("Write failed.");
		}

		let mut audio = Vec::with_capacity(FRAME * 50);
		for i in 0..50_u8 { audio.resize(audio.len() + FRAME, i); }
		std::fs::write(dir.path().join("audio.raw"), audio).expect("Write failed.");

		dir
	}

	/// # Load Disc.
	fn load(dir: &tempfile::TempDir, opts: &CddaOptions) -> Disc<DumpDevice> {
		let dev = DumpDevice::new(dir.path()).expect("Dump failed.");
		Disc::new(dev, opts).expect("Disc failed.")
	}

	#[test]
	fn t_disc_new() {
		let dir = dump(true);
		let disc = load(&dir, &CddaOptions::default());

		assert_eq!(disc.toc().track_count(), 3);
		assert_eq!(disc.cddb_id(), Cddb::from(disc.toc()));

		let text = disc.cdtext().expect("Missing CD-Text.");
		assert_eq!(text.album(), Some("Abbey Road"));
		assert_eq!(disc.track_title(1), Some("Come Together"));
		assert_eq!(disc.track_title(4), None);
		assert_eq!(disc.track_artist(1), Some("The Beatles"), "Disc artist fallback failed.");
		assert_eq!(disc.track_artist(3), Some("Paul Mccartney"));

		// Skip it.
		let disc = load(&dir, &CddaOptions::default().with_cdtext(false));
		assert!(disc.cdtext().is_none(), "CD-Text should have been skipped.");
		assert_eq!(disc.track_title(1), None);
		assert_eq!(disc.track_artist(1), None);

		// Nothing to read.
		let dir = dump(false);
		let disc = load(&dir, &CddaOptions::default());
		assert!(disc.cdtext().is_none(), "There is no CD-Text.");
	}

	#[test]
	fn t_no_cdtext() {
		assert!(no_cdtext(&CddaError::CdRead), "Read errors mean no CD-Text.");
		assert!(no_cdtext(&CddaError::CdTextIncomplete));
		assert!(! no_cdtext(&CddaError::CdTextHeader), "Bad headers are worth a warning.");
		assert!(! no_cdtext(&CddaError::CdTextSequence(1, 2)));
	}

	#[test]
	fn t_disc_new_toc() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		std::fs::write(dir.path().join("toc.bin"), [0, 2, 1, 1]).expect("Write failed.");
		let dev = DumpDevice::new(dir.path()).expect("Dump failed.");
		assert!(
			matches!(Disc::new(dev, &CddaOptions::default()), Err(CddaError::TocTracks)),
			"An empty TOC should fail.",
		);
	}

	#[test]
	fn t_disc_read() {
		let dir = dump(false);
		let mut disc = load(&dir, &CddaOptions::default().with_buffer_frames(4));

		assert_eq!(disc.track_len(1), Ok(10 * FRAME as u64));
		assert_eq!(disc.track_len(2), Ok(15 * FRAME as u64));

		// The whole first track.
		let mut buf = vec![0xFF_u8; FRAME * 10];
		assert_eq!(disc.read(1, 0, &mut buf), Ok(()));
		for (i, frame) in buf.chunks_exact(FRAME).enumerate() {
			assert!(frame.iter().all(|&b| usize::from(b) == i), "Frame {i} mismatch.");
		}

		// Straddling frames within the second track.
		let mut buf = vec![0xFF_u8; FRAME];
		assert_eq!(disc.read(2, FRAME as u64 + 100, &mut buf), Ok(()));
		assert!(buf[..FRAME - 100].iter().all(|&b| b == 11));
		assert!(buf[FRAME - 100..].iter().all(|&b| b == 12));

		// Past the end of the track.
		let mut buf = vec![0_u8; FRAME * 10];
		assert_eq!(disc.read(1, 1, &mut buf), Err(CddaError::ReadRange));
		assert_eq!(disc.read(1, u64::MAX, &mut buf), Err(CddaError::ReadRange));

		// Bad tracks.
		assert_eq!(disc.read(3, 0, &mut buf), Err(CddaError::TrackData(3)));
		assert_eq!(disc.read(4, 0, &mut buf), Err(CddaError::NoTrack(4)));
		assert_eq!(disc.read(0, 0, &mut buf), Err(CddaError::NoTrack(0)));
		assert_eq!(disc.track_len(3), Err(CddaError::TrackData(3)));
	}

	#[test]
	fn t_disc_extract() {
		let dir = dump(false);
		let out = tempfile::tempdir().expect("Tempdir failed.");

		// WAV.
		let mut disc = load(&dir, &CddaOptions::default().with_buffer_frames(3));
		let dst = disc.extract(2, out.path()).expect("Extract failed.");
		assert_eq!(dst, out.path().join("02.wav"));

		let mut reader = hound::WavReader::open(&dst).expect("Invalid WAV.");
		assert_eq!(reader.spec(), WAVE_SPEC);
		assert_eq!(reader.len(), 15 * 588 * 2, "Wrong number of samples.");
		let first = reader.samples::<i16>().next()
			.expect("Missing sample.")
			.expect("Invalid sample.");
		assert_eq!(first, i16::from_le_bytes([10, 10]));

		assert_eq!(disc.extract(3, out.path()), Err(CddaError::TrackData(3)));
		assert!(! out.path().join("03.wav").exists(), "Data tracks should not be saved.");

		// Raw.
		let mut disc = load(&dir, &CddaOptions::default().with_raw(true));
		let dst = disc.extract(1, out.path()).expect("Extract failed.");
		assert_eq!(dst, out.path().join("01.pcm"));
		let raw = std::fs::read(&dst).expect("Read failed.");
		assert_eq!(raw.len(), FRAME * 10);
		assert!(raw[FRAME * 9..].iter().all(|&b| b == 9));

		// Again, replacing the file.
		assert_eq!(disc.extract(1, out.path()), Ok(dst.clone()));
		assert_eq!(std::fs::read(&dst).expect("Read failed."), raw);

		// Bad destination.
		assert!(matches!(
			disc.extract(1, out.path().join("nope")),
			Err(CddaError::Write(_)),
		));
	}

	#[test]
	fn t_disc_display() {
		let dir = dump(true);
		let disc = load(&dir, &CddaOptions::default());
		let out = disc.to_string();

		assert!(out.starts_with(&format!("CDDB:    {}\n", disc.cddb_id())), "Bad summary:\n{out}");
		assert!(out.contains("Album:   Abbey Road\n"));
		assert!(out.contains("Genre:   Rock Music\n"));
		assert!(out.contains(&disc.toc().to_string()), "Missing TOC.");
		assert!(out.contains("01  Come Together\n"));
		assert!(out.contains("03  Maxwell's Silver Hammer (Paul Mccartney)\n"));
	}
}
