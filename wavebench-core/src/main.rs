//! Interactive command-line frontend
//!
//! Stands in for the button row of a GUI shell: one command per user action,
//! read from stdin, with a free-text frequency argument for the two filter
//! commands.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use wavebench::audio::wav::save_wav;
use wavebench::audio::CpalPlayer;
use wavebench::filters::parse_frequency;
use wavebench::plot::CsvRenderer;
use wavebench::{Outcome, Session, SessionError};

#[derive(Parser)]
#[command(name = "wavebench", about = "Interactive audio filtering workbench")]
struct Args {
    /// WAV file to load at startup
    wav: Option<PathBuf>,

    /// Directory for CSV plot data
    #[arg(long, default_value = "plots")]
    plots: PathBuf,
}

const HELP: &str = "\
commands:
  load <path>      load a mono WAV file, play it, plot it
  noise            play the 440 Hz noise tone
  noisy            play the noisy mix (original + noise)
  lowpass <hz>     low-pass filter the noisy mix at <hz>
  bandpass <hz>    band-pass filter the noisy mix around <hz>
  save <path>      write the latest signal as a WAV file
  help             show this list
  quit             exit";

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut session = Session::new(
        Box::new(CpalPlayer::new()),
        Box::new(CsvRenderer::new(&args.plots)),
    );

    if let Some(path) = &args.wav {
        report(session.show_original(path));
    }

    println!("{}", HELP);
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let arg = parts.next();

        match command {
            "load" => match arg {
                Some(path) => report(session.show_original(Path::new(path))),
                None => println!("usage: load <path>"),
            },
            "noise" => report(session.play_noise()),
            "noisy" => report(session.play_noisy()),
            "lowpass" => filter_command(arg, |hz| session.apply_lowpass(hz)),
            "bandpass" => filter_command(arg, |hz| session.apply_bandpass(hz)),
            "save" => match (arg, session.latest()) {
                (None, _) => println!("usage: save <path>"),
                (_, None) => println!("nothing to save yet"),
                (Some(path), Some(buffer)) => match save_wav(buffer, Path::new(path)) {
                    Ok(()) => println!("saved {}", path),
                    Err(e) => eprintln!("error: {}", e),
                },
            },
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            other => println!("unknown command '{}'; try 'help'", other),
        }
    }
}

/// Parse the frequency field, then run the filter action
fn filter_command<F>(arg: Option<&str>, apply: F)
where
    F: FnOnce(f64) -> Result<Outcome, SessionError>,
{
    let Some(text) = arg else {
        println!("usage: lowpass|bandpass <hz>");
        return;
    };

    match parse_frequency(text) {
        Ok(hz) => report(apply(hz)),
        Err(e) => eprintln!("error: {}", e),
    }
}

/// Print the result of a session action without ending the loop
fn report(result: Result<Outcome, SessionError>) {
    match result {
        Ok(Outcome::Completed) => {}
        Ok(Outcome::Skipped) => {
            println!("nothing to do yet: load a file first, and play the noisy mix before filtering")
        }
        Err(e) => eprintln!("error: {}", e),
    }
}
