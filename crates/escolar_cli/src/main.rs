//! Operational CLI over the tuition ledger core.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `escolar_core` linkage.
//! - Expose the everyday read surfaces (dashboard, listings, delinquency)
//!   plus the ledger switch and demo seeding, against the session files in
//!   the working directory.

mod seed;

use chrono::{Datelike, Local};
use escolar_core::service::delinquency;
use escolar_core::{Month, Session, SessionConfig};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    init_logging_from_env()?;

    match args.first().map(String::as_str) {
        Some("ping") => {
            println!("escolar_core ping={}", escolar_core::ping());
            println!("escolar_core version={}", escolar_core::core_version());
            Ok(())
        }
        Some("stats") => print_stats(&open_session()?),
        Some("students") => print_students(&open_session()?),
        Some("payments") => print_payments(&open_session()?),
        Some("report") => print_report(&open_session()?, args.get(1).map(String::as_str)),
        Some("settings") => print_settings(&open_session()?),
        Some("seed") => {
            let session = open_session()?;
            println!("{}", seed::seed(session.store())?);
            Ok(())
        }
        Some("switch") => {
            let target = args.get(1).ok_or("usage: escolar_cli switch <ledger-file>")?;
            let mut session = open_session()?;
            session.switch_ledger(target).map_err(|err| err.to_string())?;
            println!("active ledger: {}", session.ledger_path().display());
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

/// Opens the session against the pointer/ledger files in the working
/// directory, the same layout the desktop frontend uses.
fn open_session() -> Result<Session, String> {
    Session::open(SessionConfig::default()).map_err(|err| err.to_string())
}

fn print_stats(session: &Session) -> Result<(), String> {
    let settings = session.settings();
    let today = Local::now().date_naive();
    let period = Month::from_index(today.month0() as usize).unwrap_or(settings.cycle_start);

    let stats = session
        .store()
        .dashboard_stats(period)
        .map_err(|err| err.to_string())?;

    println!("{}", settings.school_name);
    println!("ledger:   {}", session.ledger_path().display());
    println!("students: {}", stats.student_count);
    println!("income {}: {}", period.label(), stats.period_income);
    Ok(())
}

fn print_students(session: &Session) -> Result<(), String> {
    let students = session
        .store()
        .list_students()
        .map_err(|err| err.to_string())?;

    if students.is_empty() {
        println!("no students enrolled");
        return Ok(());
    }
    for student in students {
        println!(
            "[{}] {} ({}) - {}",
            student.student_id, student.name, student.grade, student.guardian_name
        );
    }
    Ok(())
}

fn print_payments(session: &Session) -> Result<(), String> {
    let history = session
        .store()
        .payment_history()
        .map_err(|err| err.to_string())?;

    if history.is_empty() {
        println!("no payments recorded");
        return Ok(());
    }
    for row in history {
        println!(
            "[{}] {} ({}) - {} {}",
            row.payment_id,
            row.student_name,
            row.grade,
            row.period.label(),
            row.amount
        );
    }
    Ok(())
}

fn print_report(session: &Session, month: Option<&str>) -> Result<(), String> {
    let settings = session.settings();

    // An explicit month wins; otherwise today's date and the billing
    // cutoff decide which period the scan runs against.
    let reference = match month {
        Some(label) => Month::parse_required(label).map_err(|err| err.to_string())?,
        None => {
            let today = Local::now().date_naive();
            match delinquency::reference_month(today, settings.billing_day) {
                Some(reference) => reference,
                None => {
                    println!("nothing due yet this year");
                    return Ok(());
                }
            }
        }
    };
    let required = delinquency::required_periods(settings.cycle_start, reference);
    let report =
        delinquency::scan_ledger(session.store(), required).map_err(|err| err.to_string())?;

    if report.is_empty() {
        println!("no delinquent students through {}", reference.label());
        return Ok(());
    }
    for row in report {
        let phone = row.guardian_phone.as_deref().unwrap_or("-");
        println!(
            "[{}] {} ({}): {} | {} {}",
            row.student_id,
            row.student_name,
            row.grade,
            row.owed_label(),
            row.guardian_name,
            phone
        );
    }
    Ok(())
}

fn print_settings(session: &Session) -> Result<(), String> {
    let settings = session.settings();
    println!("school:      {}", settings.school_name);
    println!("admin phone: {}", settings.admin_phone);
    println!("billing day: {}", settings.billing_day);
    println!("cycle start: {}", settings.cycle_start.label());
    println!("show chart:  {}", settings.show_chart);
    Ok(())
}

/// Reads `ESCOLAR_LOG` as the level; logging stays off when it is unset.
fn init_logging_from_env() -> Result<(), String> {
    let level = match env::var("ESCOLAR_LOG") {
        Ok(level) => level,
        Err(_) => return Ok(()),
    };

    let log_dir = env::current_dir()
        .map_err(|err| format!("cannot resolve working directory: {err}"))?
        .join("logs");
    let log_dir = log_dir
        .to_str()
        .ok_or("log directory path is not valid UTF-8")?;
    escolar_core::init_logging(&level, log_dir)
}

fn print_usage() {
    println!("Usage: escolar_cli <command>");
    println!();
    println!("Commands:");
    println!("  ping                  verify escolar_core linkage");
    println!("  stats                 student count and income for the current month");
    println!("  students              list enrolled students with their guardians");
    println!("  payments              list the payment history");
    println!("  report [month]        delinquency report through a month (default: today)");
    println!("  settings              show the active school settings");
    println!("  switch <ledger-file>  switch the active ledger");
    println!("  seed                  load demo data into an empty ledger");
}
