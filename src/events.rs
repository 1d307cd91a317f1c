use std::io;
use std::sync::mpsc;
use std::thread;

use unsegen::input::Input;

pub enum Event {
    Input(Input),
}

/// Reads terminal input on its own thread and hands it over as events.
pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    _input_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        let (tx, rx) = mpsc::channel();

        let input_handle = thread::spawn(move || {
            let stdin = io::stdin();
            for input in Input::read_all(stdin.lock()) {
                match input {
                    Ok(input) => {
                        if tx.send(Event::Input(input)).is_err() {
                            return;
                        }
                    }
                    Err(e) => log::warn!("Could not read input: {}", e),
                }
            }
        });

        Dispatcher {
            rx,
            _input_handle: input_handle,
        }
    }
}

impl Dispatcher {
    /// Blocks until the next event. Fails once stdin is closed.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
