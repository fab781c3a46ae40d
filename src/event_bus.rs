/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Thread that receives events emitted by the [bootstrapper](crate::bootstrap::Bootstrapper) and
//! passes them to event handlers.
//!
//! When the thread receives a message containing an [event](crate::events::Event), it triggers
//! the execution of all handlers defined for the contained event type, where the handlers for
//! each event type are stored in [`EventHandlers`].
//!
//! The bootstrapper is a passive subsystem driven by host callbacks, so the host owns this
//! thread: build an `EventHandlers`, create an `mpsc` channel, hand the sender to the
//! bootstrapper as its event publisher, and pass the receiver to [`start_event_bus`]. When no
//! handlers are present, skip starting the thread altogether.
//!
//! ## Event Handlers
//!
//! An instance of `EventHandlers` contains, per event type:
//! 1. An optional host-provided handler, and
//! 2. If logging is enabled, the default logging handler defined in [logging](crate::logging).

use std::{
    sync::mpsc::{Receiver, TryRecvError},
    thread,
    thread::JoinHandle,
};

use crate::{events::*, logging::Logger};

/// Pointer to a handler closure, parametrised by the argument (for our use case, event) type.
pub type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

/// Stores the two optional handlers enabled for an event type: one host-provided handler, and one
/// logging handler, defined in [`logging`](crate::logging).
pub struct HandlerPair<T: Logger> {
    user_defined_handler: Option<HandlerPtr<T>>,
    logging_handler: Option<HandlerPtr<T>>,
}

impl<T: Logger> HandlerPair<T> {
    // Checks if no handlers are defined for this event.
    fn is_empty(&self) -> bool {
        self.user_defined_handler.is_none() && self.logging_handler.is_none()
    }

    /// Creates a new `HandlerPair` with the user-defined handler, and the default logging handler
    /// if logging is enabled.
    fn new(log: bool, user_defined_handler: Option<HandlerPtr<T>>) -> HandlerPair<T> {
        HandlerPair {
            user_defined_handler,
            logging_handler: if log { Some(T::get_logger()) } else { None },
        }
    }

    fn fire(&self, event: &T) {
        if let Some(handler) = &self.user_defined_handler {
            handler(event)
        }
        if let Some(handler) = &self.logging_handler {
            handler(event)
        }
    }
}

/// Stores the `HandlerPair` of host-provided and optional logging handlers for each pre-defined
/// event type from [events](crate::events).
pub struct EventHandlers {
    pub start_bootstrap_handlers: HandlerPair<StartBootstrapEvent>,
    pub finish_bootstrap_handlers: HandlerPair<FinishBootstrapEvent>,

    pub start_round_handlers: HandlerPair<StartRoundEvent>,
    pub no_accepted_blocks_handlers: HandlerPair<NoAcceptedBlocksEvent>,

    pub start_fetch_handlers: HandlerPair<StartFetchEvent>,
    pub fetch_progress_handlers: HandlerPair<FetchProgressEvent>,
    pub start_execute_handlers: HandlerPair<StartExecuteEvent>,
    pub execute_progress_handlers: HandlerPair<ExecuteProgressEvent>,

    pub restart_bootstrap_handlers: HandlerPair<RestartBootstrapEvent>,
    pub await_subnet_handlers: HandlerPair<AwaitSubnetEvent>,
}

impl EventHandlers {
    /// Creates the handler pairs for all pre-defined event types given the host-provided
    /// handlers, and information on whether logging is enabled.
    pub fn new(
        log: bool,
        start_bootstrap_handler: Option<HandlerPtr<StartBootstrapEvent>>,
        finish_bootstrap_handler: Option<HandlerPtr<FinishBootstrapEvent>>,
        start_round_handler: Option<HandlerPtr<StartRoundEvent>>,
        no_accepted_blocks_handler: Option<HandlerPtr<NoAcceptedBlocksEvent>>,
        start_fetch_handler: Option<HandlerPtr<StartFetchEvent>>,
        fetch_progress_handler: Option<HandlerPtr<FetchProgressEvent>>,
        start_execute_handler: Option<HandlerPtr<StartExecuteEvent>>,
        execute_progress_handler: Option<HandlerPtr<ExecuteProgressEvent>>,
        restart_bootstrap_handler: Option<HandlerPtr<RestartBootstrapEvent>>,
        await_subnet_handler: Option<HandlerPtr<AwaitSubnetEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            start_bootstrap_handlers: HandlerPair::new(log, start_bootstrap_handler),
            finish_bootstrap_handlers: HandlerPair::new(log, finish_bootstrap_handler),
            start_round_handlers: HandlerPair::new(log, start_round_handler),
            no_accepted_blocks_handlers: HandlerPair::new(log, no_accepted_blocks_handler),
            start_fetch_handlers: HandlerPair::new(log, start_fetch_handler),
            fetch_progress_handlers: HandlerPair::new(log, fetch_progress_handler),
            start_execute_handlers: HandlerPair::new(log, start_execute_handler),
            execute_progress_handlers: HandlerPair::new(log, execute_progress_handler),
            restart_bootstrap_handlers: HandlerPair::new(log, restart_bootstrap_handler),
            await_subnet_handlers: HandlerPair::new(log, await_subnet_handler),
        }
    }

    /// Creates handler pairs containing only the default logging handlers.
    pub fn logging_only() -> EventHandlers {
        EventHandlers::new(
            true, None, None, None, None, None, None, None, None, None, None,
        )
    }

    /// Checks if no handlers are defined, i.e., neither host-provided handlers were defined nor
    /// logging is enabled.
    pub fn is_empty(&self) -> bool {
        self.start_bootstrap_handlers.is_empty()
            && self.finish_bootstrap_handlers.is_empty()
            && self.start_round_handlers.is_empty()
            && self.no_accepted_blocks_handlers.is_empty()
            && self.start_fetch_handlers.is_empty()
            && self.fetch_progress_handlers.is_empty()
            && self.start_execute_handlers.is_empty()
            && self.execute_progress_handlers.is_empty()
            && self.restart_bootstrap_handlers.is_empty()
            && self.await_subnet_handlers.is_empty()
    }

    /// Triggers the execution of each of the two handlers - the host-provided and the logging
    /// handler, if defined - for a given event type from [events](crate::events).
    fn fire_handlers(&self, event: Event) {
        match event {
            Event::StartBootstrap(event) => self.start_bootstrap_handlers.fire(&event),
            Event::FinishBootstrap(event) => self.finish_bootstrap_handlers.fire(&event),
            Event::StartRound(event) => self.start_round_handlers.fire(&event),
            Event::NoAcceptedBlocks(event) => self.no_accepted_blocks_handlers.fire(&event),
            Event::StartFetch(event) => self.start_fetch_handlers.fire(&event),
            Event::FetchProgress(event) => self.fetch_progress_handlers.fire(&event),
            Event::StartExecute(event) => self.start_execute_handlers.fire(&event),
            Event::ExecuteProgress(event) => self.execute_progress_handlers.fire(&event),
            Event::RestartBootstrap(event) => self.restart_bootstrap_handlers.fire(&event),
            Event::AwaitSubnet(event) => self.await_subnet_handlers.fire(&event),
        }
    }
}

/// Spawn the event-bus thread. It dispatches every event arriving on `event_subscriber` to
/// `event_handlers` until `shutdown_signal` fires or the publisher side disconnects.
pub fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => return,
        }

        match event_subscriber.try_recv() {
            Ok(event) => event_handlers.fire_handlers(event),
            Err(TryRecvError::Empty) => thread::yield_now(),
            Err(TryRecvError::Disconnected) => return,
        }
    })
}
