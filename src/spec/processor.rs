use std::ffi::OsString;

use log::debug;

use super::{ErrorHandler, LogErrorHandler, ParseOutcome, Spec, SpecError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// What the application should do after processing its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// Handed to actions so they can ask for the process to exit.
#[derive(Debug, Default)]
pub struct Control {
    exit: Option<i32>,
}

impl Control {
    /// Stop after this action and exit with `status`.
    pub fn exit(&mut self, status: i32) {
        self.exit = Some(status);
    }

    pub fn exit_requested(&self) -> Option<i32> {
        self.exit
    }
}

/// Runs the actions bound in a [`Spec`] for an argument vector.
pub struct Processor<'s, 'a> {
    spec: &'s Spec<'a>,
    handler: Box<dyn ErrorHandler + 's>,
}

impl<'s, 'a> Processor<'s, 'a> {
    /// Errors go to stderr through a [`LogErrorHandler`] configured from
    /// the spec's [`Config`](crate::config::Config).
    pub fn new(spec: &'s Spec<'a>) -> Self {
        let config = spec.config();
        let handler = LogErrorHandler::stderr(config.program_name())
            .with_max_entries(config.max_logged_errors);
        Self {
            spec,
            handler: Box::new(handler),
        }
    }

    pub fn with_handler(mut self, handler: impl ErrorHandler + 's) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Process `args` (without the program name). Fails only when the
    /// declarations themselves are defective.
    pub fn process<I, S>(&self, args: I) -> Result<Flow, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut control = Control::default();
        match self.spec.parse(args)? {
            ParseOutcome::ShortCircuit(option) => {
                if let Some(action) = &self.spec.options[option.option].action {
                    action(option.value.as_ref(), &mut control);
                }
                Ok(Flow::Exit(control.exit_requested().unwrap_or(EXIT_SUCCESS)))
            }
            ParseOutcome::Failed(errors) => {
                let mut status = self.spec.config().failure_exit_status;
                self.handler.handle(&errors, &mut status);
                Ok(Flow::Exit(status))
            }
            ParseOutcome::Parsed(parsed) => {
                for option in &parsed.options {
                    if let Some(action) = &self.spec.options[option.option].action {
                        action(option.value.as_ref(), &mut control);
                        if let Some(status) = control.exit_requested() {
                            debug!("option '{}' requested exit {status}", option.name);
                            return Ok(Flow::Exit(status));
                        }
                    }
                }
                if let Some(action) = parsed
                    .pattern
                    .and_then(|p| self.spec.patterns[p].action.as_ref())
                {
                    action(&parsed.bindings, &mut control);
                }
                Ok(control.exit_requested().map_or(Flow::Continue, Flow::Exit))
            }
        }
    }

    /// Like [`process`](Self::process) for OS arguments; text that is not
    /// valid UTF-8 is replaced lossily.
    pub fn process_os<I>(&self, args: I) -> Result<Flow, SpecError>
    where
        I: IntoIterator<Item = OsString>,
    {
        self.process(
            args.into_iter()
                .map(|a| a.to_string_lossy().into_owned()),
        )
    }
}
