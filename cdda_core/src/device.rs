/*!
# CDDA: Devices
*/

use crate::{
	BYTES_PER_FRAME,
	CD_LEADIN,
	CddaError,
};
use std::{
	fs::File,
	io::{
		Read,
		Seek,
		SeekFrom,
	},
	path::{
		Path,
		PathBuf,
	},
};



/// # Dump File: Table of Contents.
const DUMP_TOC: &str = "toc.bin";

/// # Dump File: CD-Text.
const DUMP_CDTEXT: &str = "cdtext.bin";

/// # Dump File: Audio.
const DUMP_AUDIO: &str = "audio.raw";



#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
/// # SCSI Command.
///
/// The READ TOC/PMA/ATIP formats this library needs.
pub enum ScsiCommand {
	/// # Table of Contents (Format 0000b).
	ReadToc,

	/// # CD-Text (Format 0101b).
	ReadCdText,
}



/// # Device Reader.
///
/// This is the only thing this library needs from an optical drive (or
/// anything pretending to be one).
pub trait DeviceReader {
	/// # Read SCSI Command.
	///
	/// Issue the command, writing the raw response (header and all) to `buf`.
	/// Responses shorter than the buffer leave the rest of it alone.
	///
	/// ## Errors
	///
	/// Implementations should return an error if the command fails.
	fn read_scsi_command(&mut self, command: ScsiCommand, buf: &mut [u8])
	-> Result<(), CddaError>;

	/// # Read Raw Frames.
	///
	/// Read `frame_count` raw 2352-byte audio frames into `buf`, starting at
	/// absolute frame `first_frame` (i.e. including the 150-frame lead-in).
	///
	/// ## Errors
	///
	/// Implementations should return an error if the read fails.
	fn read_frames_raw(&mut self, first_frame: u32, frame_count: u32, buf: &mut [u8])
	-> Result<(), CddaError>;
}

impl<D: DeviceReader + ?Sized> DeviceReader for &mut D {
	#[inline]
	fn read_scsi_command(&mut self, command: ScsiCommand, buf: &mut [u8])
	-> Result<(), CddaError> {
		(**self).read_scsi_command(command, buf)
	}

	#[inline]
	fn read_frames_raw(&mut self, first_frame: u32, frame_count: u32, buf: &mut [u8])
	-> Result<(), CddaError> {
		(**self).read_frames_raw(first_frame, frame_count, buf)
	}
}



#[derive(Debug)]
/// # Dump Device.
///
/// This is a [`DeviceReader`] backed by a directory of files captured from a
/// real drive:
///
/// | File         | Contents |
/// | ------------ | -------- |
/// | `toc.bin`    | The raw READ TOC response. Required. |
/// | `cdtext.bin` | The raw READ TOC (CD-Text) response. Optional. |
/// | `audio.raw`  | Raw frames, starting with frame 150. Optional. |
///
/// Frames inside the lead-in read as silence.
pub struct DumpDevice {
	/// # Source Directory.
	dir: PathBuf,

	/// # Table of Contents.
	toc: Vec<u8>,

	/// # CD-Text.
	cdtext: Option<Vec<u8>>,

	/// # Audio Image.
	audio: Option<File>,
}

impl DumpDevice {
	/// # New.
	///
	/// Load the dump from `dir`.
	///
	/// ## Errors
	///
	/// This will return an error if the path is not a directory or the table
	/// of contents is missing or empty.
	pub fn new<P>(dir: P) -> Result<Self, CddaError>
	where P: AsRef<Path> {
		let dir = dir.as_ref();
		let dir = std::fs::canonicalize(dir)
			.ok()
			.filter(|d| d.is_dir())
			.ok_or_else(|| CddaError::Device(dir.to_string_lossy().into_owned()))?;

		let toc = std::fs::read(dir.join(DUMP_TOC))
			.ok()
			.filter(|v| ! v.is_empty())
			.ok_or_else(|| CddaError::Device(dir.join(DUMP_TOC).to_string_lossy().into_owned()))?;
		let cdtext = std::fs::read(dir.join(DUMP_CDTEXT)).ok().filter(|v| ! v.is_empty());
		let audio = File::open(dir.join(DUMP_AUDIO)).ok();

		Ok(Self { dir, toc, cdtext, audio })
	}

	#[must_use]
	/// # Directory.
	pub fn dir(&self) -> &Path { &self.dir }

	#[must_use]
	/// # Has CD-Text?
	pub const fn has_cdtext(&self) -> bool { self.cdtext.is_some() }

	#[must_use]
	/// # Has Audio?
	pub const fn has_audio(&self) -> bool { self.audio.is_some() }
}

impl DeviceReader for DumpDevice {
	fn read_scsi_command(&mut self, command: ScsiCommand, buf: &mut [u8])
	-> Result<(), CddaError> {
		let src = match command {
			ScsiCommand::ReadToc => self.toc.as_slice(),
			ScsiCommand::ReadCdText => self.cdtext.as_deref().ok_or(CddaError::CdRead)?,
		};

		let len = src.len().min(buf.len());
		buf[..len].copy_from_slice(&src[..len]);
		Ok(())
	}

	fn read_frames_raw(&mut self, first_frame: u32, frame_count: u32, buf: &mut [u8])
	-> Result<(), CddaError> {
		let file = self.audio.as_mut().ok_or(CddaError::CdRead)?;
		let frame_size = usize::from(BYTES_PER_FRAME);
		let len = usize::try_from(frame_count).ok()
			.and_then(|n| n.checked_mul(frame_size))
			.filter(|n| *n <= buf.len())
			.ok_or(CddaError::CdRead)?;
		let buf = &mut buf[..len];

		// Lead-in silence.
		let silent = usize::try_from(CD_LEADIN.saturating_sub(first_frame).min(frame_count))
			.map_err(|_| CddaError::CdRead)? * frame_size;
		let (head, tail) = buf.split_at_mut(silent);
		head.fill(0);
		if tail.is_empty() { return Ok(()); }

		let start = u64::from(first_frame.max(CD_LEADIN) - CD_LEADIN) * u64::from(BYTES_PER_FRAME);
		file.seek(SeekFrom::Start(start))
			.and_then(|_| file.read_exact(tail))
			.map_err(|_| CddaError::CdRead)
	}
}
