//! Runs a port from the command line. Alerts and choices go to stderr so
//! that the ported record can be written to stdout.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::Context;
use pkuport::alert::Alert;
use pkuport::dex::{JsonDex, SharedDex};
use pkuport::{Port, Porter};

/// Parses a `TAG=N` choice answer.
pub fn parse_choice(arg: &str) -> Result<(String, usize), String> {
    let (tag, index) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TAG=N, got \"{arg}\""))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("\"{index}\" is not an option number"))?;
    Ok((tag.trim().to_owned(), index))
}

/// Parses a `TAG=TEXT` typed answer. Only the first `=` separates.
pub fn parse_text_entry(arg: &str) -> Result<(String, String), String> {
    let (tag, text) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=TEXT, got \"{arg}\""))?;
    Ok((tag.trim().to_owned(), text.to_owned()))
}

pub fn load_dex(path: &Path) -> anyhow::Result<SharedDex> {
    let file = File::open(path).with_context(|| format!("could not open dex {}", path.display()))?;
    let dex = JsonDex::from_reader(BufReader::new(file))
        .with_context(|| format!("could not read dex {}", path.display()))?;
    Ok(dex.shared())
}

/// Writes to `out`, or to stdout when no path was given.
pub fn write_output(out: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            println!("Saving to {}", path.display());
            std::fs::write(path, bytes).with_context(|| format!("could not write {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn print_alerts(label: &str, alerts: &[Alert]) {
    for alert in alerts {
        eprintln!("{label}: {alert}");
    }
}

/// Runs both halves, answering choices from `answers` and `texts` in
/// between. Unanswered choices keep their default option.
pub fn drive<P: Porter>(
    mut port: Port<P>,
    answers: &[(String, usize)],
    texts: &[(String, String)],
) -> anyhow::Result<P::Output> {
    port.first_half()?;
    print_alerts("note", port.notes());
    print_alerts("warning", port.warnings());
    print_alerts("error", port.errors());
    let seen_errors = port.errors().len();

    for (tag, choice) in port.choices() {
        eprintln!("choice {tag}: {}", choice.alert.message);
        for (idx, option) in choice.options.iter().enumerate() {
            let marker = if idx == choice.selected() { '*' } else { ' ' };
            eprintln!("  {marker}[{idx}] {}: {}", option.label, option.message);
        }
        if let Some(hint) = choice.text_hint() {
            eprintln!("   [=] {hint}");
        }
    }
    for (tag, index) in answers {
        port.select(tag, *index)
            .with_context(|| format!("could not answer the {tag} choice with option {index}"))?;
        log::info!("Answered {tag} with option {index}");
    }
    for (tag, text) in texts {
        port.set_text_entry(tag, text)
            .with_context(|| format!("could not answer the {tag} choice with \"{text}\""))?;
        log::info!("Answered {tag} with \"{text}\"");
    }

    let output = port.second_half()?;
    print_alerts("error", &port.errors()[seen_errors..]);
    for remediation in port.remediations() {
        eprintln!(
            "remediation for {}: {}",
            remediation.tag,
            serde_json::to_string(&remediation.command)?
        );
    }
    Ok(output)
}
