//! This module contains the main entrypoint to the dimarray cli.

use self::config::Config;
use anyhow::{format_err, Result};
use clap::Clap;
use colored::Colorize;
use dimarray_attrarray::{AttrValue, DType, DynAttrArray, Nested};
use std::path::{Path, PathBuf};

mod config;

#[derive(Clap)]
#[clap(
	about = "Create and inspect arrays that carry named attributes.",
	setting = clap::AppSettings::DisableHelpSubcommand,
)]
enum Options {
	#[clap(name = "new")]
	New(NewOptions),
	#[clap(name = "inspect")]
	Inspect(InspectOptions),
}

#[derive(Clap, Debug)]
#[clap(about = "create an array file")]
#[clap(long_about = "create an array file from a .json file containing a nested list")]
struct NewOptions {
	#[clap(short, long, about = "the path to your .json file")]
	data: PathBuf,
	#[clap(short, long, about = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(long, about = "the element type, overriding the config")]
	dtype: Option<DType>,
	#[clap(
		short,
		long = "attr",
		about = "an attribute given as name=value, where value is parsed as json if possible",
		parse(try_from_str = parse_attr)
	)]
	attrs: Vec<AttrArg>,
	#[clap(short, long, about = "the path to write the array file to")]
	output: Option<PathBuf>,
}

#[derive(Clap, Debug)]
#[clap(about = "print the dtype, shape and attributes of an array file")]
struct InspectOptions {
	#[clap(about = "the path to the array file")]
	path: PathBuf,
}

#[derive(Debug)]
struct AttrArg {
	name: String,
	value: AttrValue,
}

fn main() {
	init_logger();
	let options = Options::parse();
	let result = match options {
		Options::New(options) => cli_new(options),
		Options::Inspect(options) => cli_inspect(options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn init_logger() {
	let env = env_logger::Env::default()
		.default_filter_or("dimarray_cli=info,dimarray_attrarray=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
}

fn cli_new(options: NewOptions) -> Result<()> {
	let config = match options.config.as_deref() {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};

	// Attributes given on the command line override the ones in the config.
	let attrs = options
		.attrs
		.into_iter()
		.fold(config.attrs(), |attrs, attr| attrs.with(attr.name, attr.value));
	let dtype = options.dtype.or(config.dtype);

	let file = std::fs::File::open(&options.data)?;
	let data: Nested = serde_json::from_reader(std::io::BufReader::new(file))?;
	let array = DynAttrArray::new(data, dtype, attrs)?;

	// Retrieve the output path from the command line arguments or generate a default.
	let output_path = match options.output {
		Some(output) => output,
		None => {
			let dir = std::env::current_dir()?;
			let name = options
				.data
				.file_stem()
				.and_then(|stem| stem.to_str())
				.ok_or_else(|| format_err!("failed to determine a name for the output file"))?;
			available_path(&dir, name, "dimarray")?
		}
	};
	array.to_file(&output_path)?;
	log::info!(
		"wrote {} array with shape {:?} to {}",
		array.dtype(),
		array.shape(),
		output_path.display()
	);
	Ok(())
}

fn cli_inspect(options: InspectOptions) -> Result<()> {
	let array = DynAttrArray::from_path(&options.path)?;
	println!("{} {}", "dtype:".bold(), array.dtype());
	println!("{} {:?}", "shape:".bold(), array.shape());
	let required = array
		.required_attrs()
		.iter()
		.map(|attr| format!("{} ({})", attr.name, attr.kind))
		.collect::<Vec<_>>();
	println!("{} [{}]", "required attrs:".bold(), required.join(", "));
	println!("{}", "attrs:".bold());
	for (name, value) in array.attrs().iter() {
		println!("  {} = {}", name, serde_json::to_string(value)?);
	}
	Ok(())
}

fn parse_attr(arg: &str) -> Result<AttrArg> {
	let mut parts = arg.splitn(2, '=');
	let name = parts.next().unwrap_or_default().trim();
	let value = parts
		.next()
		.ok_or_else(|| format_err!("expected an attribute of the form name=value, got {}", arg))?;
	if name.is_empty() {
		return Err(format_err!("attribute names can not be empty"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| AttrValue::from(value));
	Ok(AttrArg {
		name: name.to_owned(),
		value,
	})
}

/// This function checks if a file with the given name and extension already exists at the path `base`, and if it does, it appends " 1", " 2", etc. to it until it finds a name that will not overwrite an existing file.
fn available_path(dir: &Path, name: &str, extension: &str) -> Result<PathBuf> {
	let mut i = 0;
	loop {
		let mut filename = String::from(name);
		if i > 0 {
			filename.push(' ');
			filename.push_str(&i.to_string());
		}
		filename.push('.');
		filename.push_str(extension);
		let path = dir.join(filename);
		match std::fs::metadata(&path) {
			// If a file at the path does not exist, return the path.
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(path),
			Err(error) => return Err(error.into()),
			Ok(_) => i += 1,
		}
	}
}

#[test]
fn test_parse_attr() {
	let attr = parse_attr("name=eeg").unwrap();
	assert_eq!(attr.name, "name");
	assert_eq!(attr.value, AttrValue::from("eeg"));
	let attr = parse_attr("samplerate=500.5").unwrap();
	assert_eq!(attr.value, AttrValue::Float(500.5));
	let attr = parse_attr("channels=[1, 2]").unwrap();
	assert_eq!(attr.value, AttrValue::from(vec![1, 2]));
	let attr = parse_attr("expr=a=b").unwrap();
	assert_eq!(attr.value, AttrValue::from("a=b"));
	assert!(parse_attr("name").is_err());
	assert!(parse_attr("=eeg").is_err());
}

#[test]
fn test_available_path() {
	let dir = std::env::temp_dir().join(format!("dimarray_cli_{}", std::process::id()));
	std::fs::create_dir_all(&dir).unwrap();
	let first = available_path(&dir, "data", "dimarray").unwrap();
	assert_eq!(first, dir.join("data.dimarray"));
	std::fs::write(&first, b"").unwrap();
	let second = available_path(&dir, "data", "dimarray").unwrap();
	assert_eq!(second, dir.join("data 1.dimarray"));
	std::fs::remove_dir_all(&dir).unwrap();
}
