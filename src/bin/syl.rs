extern crate syllabus as lib;

use chrono::NaiveDate;
use flexi_logger::{FileSpec, Logger};
use lib::agenda::Agenda;
use lib::app::App;
use lib::command::Cmd;
use lib::events::Dispatcher;
use lib::model::datetime::parse_date;
use lib::model::ProgramId;
use lib::period::Granularity;
use nix::sys::termios;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "syl",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "Syllabus - A timetable for course sessions and assignments."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the calendar non-interactively"
    )]
    pub show: bool,

    #[structopt(short = "v", long = "view", help = "day, week or month")]
    pub view: Option<Granularity>,

    #[structopt(
        short = "d",
        long = "date",
        help = "date to open at (YYYY-MM-DD)",
        parse(try_from_str = parse_date)
    )]
    pub date: Option<NaiveDate>,

    #[structopt(short = "p", long = "program", help = "only show this program")]
    pub program: Option<String>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    let agenda = Agenda::from_config(&config)?;

    let mut app = App::new(&config, agenda)?;

    if let Some(view) = args.view {
        app.handle(Cmd::View(view))?;
    }
    if let Some(date) = args.date {
        app.handle(Cmd::Goto(date))?;
    }
    if let Some(program) = args.program {
        app.handle(Cmd::Program(Some(ProgramId::new(program))))?;
    }
    log::debug!("Starting at {}", app.context().cursor);

    if args.show {
        print!("{}", app.render());
        return Ok(());
    }

    const STDIN: std::os::unix::io::RawFd = 0;
    let orig_attr = Mutex::new(termios::tcgetattr(STDIN)?);

    std::panic::set_hook(Box::new(move |info| {
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDIN, termios::SetArg::TCSANOW, &attr);
        }

        println!("Syllabus ran into a fatal error!");
        println!("Consider filing an issue with a log file and the backtrace below.");

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let dispatcher = Dispatcher::default();
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    app.run(dispatcher, term)?;
    Ok(())
}
