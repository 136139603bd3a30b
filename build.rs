use serde::{de::Error, Deserializer};
use serde_derive::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// One row of the dictionary. The tag is quoted since it holds a comma: `"(gggg,eeee)"`, where
/// repeating groups or elements use `xx` for the part that varies, e.g. `"(60xx,3000)"`.
#[derive(Debug, Deserialize)]
struct CsvTag {
    tag: String,
    name: String,
    vr: String,
    #[serde(deserialize_with = "from_vm")]
    vm: (u32, Option<u32>, u32),
    #[serde(deserialize_with = "from_flag")]
    retired: bool,
}

fn from_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    match s.as_str() {
        "Y" => Ok(true),
        "N" | "" => Ok(false),
        other => Err(D::Error::custom(format!("bad retired flag {}", other))),
    }
}

/// `1`, `1-3`, `1-n`, `2-2n` into (min, max, step).
fn from_vm<'de, D>(deserializer: D) -> Result<(u32, Option<u32>, u32), D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    let mut parts = s.splitn(2, '-');
    let min: u32 = parts
        .next()
        .unwrap_or("")
        .parse()
        .map_err(D::Error::custom)?;
    match parts.next() {
        None => Ok((min, Some(min), 1)),
        Some(max) if max.ends_with('n') => {
            let step = match &max[..max.len() - 1] {
                "" => 1,
                step => step.parse().map_err(D::Error::custom)?,
            };
            Ok((min, None, step))
        }
        Some(max) => Ok((min, Some(max.parse().map_err(D::Error::custom)?), 1)),
    }
}

/// The `xx` part is zeroed and tells which kind of repetition the entry has.
fn split_tag(tag: &str) -> (u16, u16, &'static str) {
    let inner = tag.trim_start_matches('(').trim_end_matches(')');
    let mut parts = inner.split(',');
    let group = parts.next().expect("missing group");
    let element = parts.next().expect("missing element");
    let range = if group.ends_with("xx") {
        "Group100"
    } else if element.ends_with("xx") {
        "Element100"
    } else {
        "Single"
    };
    let parse = |s: &str| u16::from_str_radix(&s.replace("xx", "00"), 16).expect("bad hex");
    (parse(group), parse(element), range)
}

impl CsvTag {
    fn to_entry_line(&self) -> String {
        let (group, element, range) = split_tag(&self.tag);
        let (min, max, step) = self.vm;
        let max = match max {
            Some(max) => format!("Some({})", max),
            None => "None".to_string(),
        };
        format!(
            concat!(
                "    DictEntry {{ tag: Tag::new({:#06X}, {:#06X}), range: TagRange::{}, ",
                "name: \"{}\", vr: \"{}\", ",
                "vm: ValueMultiplicity {{ min: {}, max: {}, step: {} }}, retired: {} }},"
            ),
            group, element, range, self.name, self.vr, min, max, step, self.retired
        )
    }
}

fn main() {
    let csv_file = std::env::var("DCM_TAG_FILE").unwrap_or("tags/tags.csv".to_string());
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("entries.rs");

    let mut rdr = csv::Reader::from_path(csv_file.clone())
        .unwrap_or_else(|e| panic!("cannot open {}: {}", csv_file, e));

    let mut table = "pub(crate) static ENTRIES: &[DictEntry] = &[\n".to_string();

    let lines: Vec<String> = rdr
        .deserialize()
        .into_iter()
        .map(|row| {
            let row: CsvTag = row.unwrap_or_else(|e| panic!("bad row in {}: {}", csv_file, e));
            row.to_entry_line()
        })
        .collect();
    table.push_str(&lines.join("\n"));
    table.push_str("\n];\n");

    fs::write(dest_path, table).unwrap();
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", csv_file);
}
