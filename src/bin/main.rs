// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 The slotbook-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use serde::Deserialize;
use slotbook_rs::{BookingEngine, BookingId, ProviderId, ProviderKind, SlotId, StudentId};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

/// Slotbook - Replay booking command CSV files
///
/// Reads publish/book/status/attend commands from a CSV file, runs them
/// through the booking engine, and outputs the resulting bookings to stdout.
#[derive(Parser, Debug)]
#[command(name = "slotbook-rs")]
#[command(about = "A booking engine that replays command CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with booking commands
    ///
    /// Expected format: op,slot,booking,provider,kind,student,start,end,occupation,topic,info,status
    /// Example: cargo run -- commands.csv > bookings.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Replay commands from CSV
    let replay = match replay_commands(BufReader::new(file)) {
        Ok(replay) => replay,
        Err(e) => {
            eprintln!("Error replaying commands: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_bookings(&replay, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the command format.
///
/// `slot` and `booking` are replay-local aliases: a `publish` row names its
/// slot (e.g. `s1`), and later rows reference it by that label. The engine's
/// generated UUIDs never appear in the input file.
#[derive(Debug, Deserialize)]
struct CsvCommand {
    op: String,
    slot: Option<String>,
    booking: Option<String>,
    provider: Option<String>,
    kind: Option<String>,
    student: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    occupation: Option<String>,
    topic: Option<String>,
    info: Option<String>,
    status: Option<String>,
}

/// Engine plus the alias maps built up during a replay.
pub struct Replay {
    pub engine: BookingEngine,
    slots: HashMap<String, SlotId>,
    bookings: Vec<(String, BookingId)>,
}

impl Replay {
    fn new() -> Self {
        Self {
            engine: BookingEngine::new(),
            slots: HashMap::new(),
            bookings: Vec::new(),
        }
    }

    pub fn slot_id(&self, alias: &str) -> Option<SlotId> {
        self.slots.get(alias).copied()
    }

    pub fn booking_id(&self, alias: &str) -> Option<BookingId> {
        self.bookings
            .iter()
            .find(|(label, _)| label == alias)
            .map(|(_, id)| *id)
    }

    fn apply(&mut self, cmd: CsvCommand) -> Result<(), String> {
        match cmd.op.to_lowercase().as_str() {
            "publish" => {
                let alias = cmd.slot.ok_or("publish requires a slot alias")?;
                let provider = cmd.provider.ok_or("publish requires a provider")?;
                let kind = match cmd.kind.as_deref() {
                    Some("mentor") => ProviderKind::Mentor,
                    Some("ambassador") => ProviderKind::Ambassador,
                    other => return Err(format!("unknown provider kind: {:?}", other)),
                };
                let start = cmd.start.ok_or("publish requires a start instant")?;
                let end = cmd.end.ok_or("publish requires an end instant")?;
                let slot = self
                    .engine
                    .publish_slot(ProviderId::new(provider), kind, start, end)
                    .map_err(|e| e.to_string())?;
                self.slots.insert(alias, slot.id);
            }
            "withdraw" => {
                let alias = cmd.slot.ok_or("withdraw requires a slot alias")?;
                let provider = cmd.provider.ok_or("withdraw requires a provider")?;
                let slot_id = self
                    .slot_id(&alias)
                    .ok_or_else(|| format!("unknown slot alias: {}", alias))?;
                self.engine
                    .withdraw_slot(&ProviderId::new(provider), &slot_id)
                    .map_err(|e| e.to_string())?;
            }
            "book" => {
                let slot_alias = cmd.slot.ok_or("book requires a slot alias")?;
                let alias = cmd.booking.ok_or("book requires a booking alias")?;
                let student = cmd.student.ok_or("book requires a student")?;
                let occupation = cmd.occupation.ok_or("book requires an occupation")?;
                let topic = cmd.topic.ok_or("book requires a topic")?;
                let slot_id = self
                    .slot_id(&slot_alias)
                    .ok_or_else(|| format!("unknown slot alias: {}", slot_alias))?;
                let record = self
                    .engine
                    .create_booking(
                        slot_id,
                        StudentId::new(student),
                        occupation,
                        topic,
                        cmd.info.filter(|s| !s.is_empty()),
                    )
                    .map_err(|e| e.to_string())?;
                self.bookings.push((alias, record.id));
            }
            "status" => {
                let alias = cmd.booking.ok_or("status requires a booking alias")?;
                let provider = cmd.provider.ok_or("status requires a provider")?;
                let status = cmd.status.ok_or("status requires a target status")?;
                let new_status = FromStr::from_str(&status)
                    .map_err(|_| format!("unknown status: {}", status))?;
                let booking_id = self
                    .booking_id(&alias)
                    .ok_or_else(|| format!("unknown booking alias: {}", alias))?;
                self.engine
                    .change_booking_status(&booking_id, &ProviderId::new(provider), new_status)
                    .map_err(|e| e.to_string())?;
            }
            "attend" => {
                let alias = cmd.booking.ok_or("attend requires a booking alias")?;
                let booking_id = self
                    .booking_id(&alias)
                    .ok_or_else(|| format!("unknown booking alias: {}", alias))?;
                self.engine
                    .mark_attended(&booking_id)
                    .map_err(|e| e.to_string())?;
            }
            other => return Err(format!("unknown op: {}", other)),
        }
        Ok(())
    }
}

/// Replay commands from a CSV reader.
///
/// Uses streaming parsing; malformed rows and failed commands are skipped
/// so a single bad row never aborts a replay.
///
/// # CSV Format
///
/// Columns: `op,slot,booking,provider,kind,student,start,end,occupation,topic,info,status`
/// - `publish`: slot alias, provider, kind, start, end
/// - `withdraw`: slot alias, provider
/// - `book`: slot alias, booking alias, student, occupation, topic, info
/// - `status`: booking alias, provider, status (acknowledged | cancelled)
/// - `attend`: booking alias
///
/// Instants are RFC 3339 UTC timestamps.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
/// Individual command failures are logged in debug mode but don't stop
/// processing.
pub fn replay_commands<R: Read>(reader: R) -> Result<Replay, csv::Error> {
    let mut replay = Replay::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CsvCommand>() {
        match result {
            Ok(cmd) => {
                if let Err(e) = replay.apply(cmd) {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping command: {}", e);
                    #[cfg(not(debug_assertions))]
                    let _ = e;
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(replay)
}

/// Write booking states to a CSV writer.
///
/// Rows appear in replay order, labelled by booking alias.
///
/// # CSV Format
///
/// Columns: `booking,slot,provider,student,status,attended,topic`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_bookings<W: Write>(replay: &Replay, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["booking", "slot", "provider", "student", "status", "attended", "topic"])?;

    for (alias, booking_id) in &replay.bookings {
        let Ok(record) = replay.engine.get_booking(booking_id) else {
            continue;
        };
        wtr.write_record([
            alias.as_str(),
            &record.slot_id.to_string(),
            &record.provider_id.to_string(),
            &record.student_id.to_string(),
            &record.status.to_string(),
            if record.attended { "true" } else { "false" },
            &record.discussion_topic,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
