use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Writes the `status_table!` invocation `src/logging.rs` includes: one row
/// per status code in 100..=599, each with its class and log level.
fn main() {
    let out_directory = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    let mut table = String::from("status_table! {\n");
    for code in 100u16..=599 {
        let (class, level) = match code / 100 {
            1 => ("1xx", "DEBUG"),
            2 => ("2xx", "DEBUG"),
            3 => ("3xx", "DEBUG"),
            4 => ("4xx", "WARN"),
            _ => ("5xx", "ERROR"),
        };
        writeln!(table, "    {code} => \"{class}\", {level};").expect("writing to a String");
    }
    table.push_str("}\n");

    fs::write(out_directory.join("status_table.rs"), table).expect("write status_table.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
