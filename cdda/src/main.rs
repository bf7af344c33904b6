/*!
# CDDA
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;

use cdda_core::CddaError;
use dactyl::NiceU64;
use fyi_msg::Msg;
use std::process::ExitCode;



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(true) => ExitCode::SUCCESS,
		Ok(false) => ExitCode::FAILURE,
		Err(e @ (CddaError::PrintHelp | CddaError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// Print the summary and extract the tracks, if any. Returns `false` if any
/// of the tracks could not be saved.
fn main__() -> Result<bool, CddaError> {
	let (opts, mut disc, output, no_summary) = cli::parse()?;

	// Quiet?
	if ! no_summary { eprintln!("{disc}"); }

	let mut good = true;
	for idx in opts.tracks() {
		match disc.extract(idx, &output) {
			Ok(dst) => {
				let size = std::fs::metadata(&dst).map_or(0, |m| m.len());
				let label = disc.track_title(idx).map_or_else(
					|| format!("Track #{idx:02}"),
					|t| format!("Track #{idx:02} ({t})"),
				);
				Msg::success(format!(
					"{label} saved to {} ({} bytes).",
					dst.display(),
					NiceU64::from(size).as_str(),
				)).eprint();
			},
			Err(e) => {
				good = false;
				Msg::error(format!("Track #{idx:02}: {e}")).eprint();
			},
		}
	}

	Ok(good)
}
