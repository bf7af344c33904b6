/*!
# CDDA: CLI
*/

use argyle::Argument;
use cdda_core::{
	CddaError,
	CddaOptions,
	Disc,
	DumpDevice,
	Toc,
};
use dactyl::traits::BytesToUnsigned;
use std::path::PathBuf;



/// # Options Return Type.
///
/// The options, the disc, the output directory, and whether or not to skip
/// the summary.
pub(super) type Parsed = (
	CddaOptions,
	Disc<DumpDevice>,
	PathBuf,
	bool,
);



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, CddaError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = CddaOptions::default();
	let mut no_summary = false;
	let mut dev = None;
	let mut output = None;
	let mut tracks = String::new();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(CddaError::PrintHelp),
			Argument::Key("--no-cdtext") => { opts = opts.with_cdtext(false); },
			Argument::Key("--no-summary") => { no_summary = true; },
			Argument::Key("--raw") => { opts = opts.with_raw(true); },
			Argument::Key("-V" | "--version") => return Err(CddaError::PrintVersion),

			Argument::KeyWithValue("-b" | "--buffer", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(CddaError::CliParse("-b/--buffer"))?;
				opts = opts.with_buffer_frames(s);
			},
			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(s); },
			Argument::KeyWithValue("-o" | "--output", s) => { output.replace(s); },
			Argument::KeyWithValue("-t" | "--track" | "--tracks", s) => {
				if ! tracks.is_empty() { tracks.push(','); }
				tracks.push_str(&s);
			},

			Argument::Other(s) => return Err(CddaError::CliArg(s)),
			_ => {},
		}
	}

	// Load the disc.
	let dev = dev.ok_or(CddaError::CliParse("-d/--dev"))?;
	let disc = Disc::new(DumpDevice::new(dev)?, &opts)?;

	// Make sure the output directory exists.
	let output = PathBuf::from(output.unwrap_or_else(|| String::from(".")));
	if ! output.is_dir() {
		std::fs::create_dir_all(&output)
			.map_err(|_| CddaError::Write(output.to_string_lossy().into_owned()))?;
	}

	opts = parse_tracks(opts, &tracks)?;
	check_tracks(disc.toc(), &opts)?;

	Ok((opts, disc, output, no_summary))
}



/// # Parse Tracks.
///
/// Add each track from a comma-separated list of numbers and/or inclusive
/// ranges.
fn parse_tracks(mut opts: CddaOptions, tracks: &str) -> Result<CddaOptions, CddaError> {
	for v in tracks.split(',') {
		let v = v.as_bytes().trim_ascii();
		if v.is_empty() { continue; }

		// It might be a range.
		if let Some(pos) = v.iter().position(|b| b'-'.eq(b)) {
			let a = v[..pos].trim_ascii();
			let b = v[pos + 1..].trim_ascii();
			if a.is_empty() || b.is_empty() {
				return Err(CddaError::CliParse("-t/--tracks"));
			}

			let a = u8::btou(a).ok_or(CddaError::CliParse("-t/--tracks"))?;
			let b = u8::btou(b).ok_or(CddaError::CliParse("-t/--tracks"))?;
			if a == 0 { return Err(CddaError::NoTrack(0)); }
			if a <= b {
				for idx in a..=b { opts = opts.with_track(idx); }
			}
			else { return Err(CddaError::CliParse("-t/--tracks")); }
		}
		// Otherwise it should be a single number.
		else {
			let v = u8::btou(v).ok_or(CddaError::CliParse("-t/--tracks"))?;
			if v == 0 { return Err(CddaError::NoTrack(0)); }
			opts = opts.with_track(v);
		}
	}

	Ok(opts)
}

/// # Check Tracks.
///
/// Make sure the desired tracks exist and hold audio.
fn check_tracks(toc: &Toc, opts: &CddaOptions) -> Result<(), CddaError> {
	for idx in opts.tracks() {
		let t = toc.track(idx).ok_or(CddaError::NoTrack(idx))?;
		if t.is_data() { return Err(CddaError::TrackData(idx)); }
	}
	Ok(())
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_parse_tracks() {
		for (raw, expected) in [
			("", &[][..]),
			("3", &[3][..]),
			("3,1", &[1, 3][..]),
			(" 2 - 4 ,9", &[2, 3, 4, 9][..]),
			("5-5,,1", &[1, 5][..]),
		] {
			let opts = parse_tracks(CddaOptions::default(), raw).expect("Tracks failed.");
			assert_eq!(
				opts.tracks().collect::<Vec<u8>>(),
				expected,
				"Track mismatch for {raw:?}.",
			);
		}

		for raw in ["a", "4-2", "-3", "3-", "1,x", "256"] {
			assert_eq!(
				parse_tracks(CddaOptions::default(), raw),
				Err(CddaError::CliParse("-t/--tracks")),
				"Expected {raw:?} to fail.",
			);
		}

		// There is no track zero.
		for raw in ["0", "0-3", "2,0-1"] {
			assert_eq!(
				parse_tracks(CddaOptions::default(), raw),
				Err(CddaError::NoTrack(0)),
				"Expected {raw:?} to fail.",
			);
		}
	}
}
