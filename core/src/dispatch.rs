//! Event dispatch for SysSentinel
//!
//! The single convergence point between the producers and the consumer.
//! Both monitoring loops hold a clone of [`Dispatcher`]; each dispatched
//! event is handed to the sink atomically, so interleaved calls from the
//! two loops never corrupt sink state. Events from the same producer
//! arrive in detection order; no ordering is promised across producers.

use crate::event::Event;
use log::warn;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Consumer-side endpoint of the event stream.
///
/// Implementations own their failure handling: `accept` is infallible
/// from the core's point of view, and the core never retries delivery.
pub trait EventSink: Send {
    /// Receive one finalized event
    fn accept(&mut self, event: Event);
}

/// Cheap-to-clone handle that forwards events to the configured sink.
///
/// No transformation, buffering, or filtering happens here; all
/// filtering already happened in the producers.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<Mutex<Box<dyn EventSink>>>,
}

impl Dispatcher {
    /// Create a dispatcher wrapping the given sink
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Hand one event to the sink
    pub fn dispatch(&self, event: Event) {
        match self.sink.lock() {
            Ok(mut sink) => sink.accept(event),
            Err(_) => warn!("event sink lock poisoned, dropping event"),
        }
    }
}

/// Sink backed by an mpsc channel, decoupling delivery from consumption
pub struct ChannelSink {
    tx: Sender<Event>,
}

impl ChannelSink {
    /// Wrap an existing sender
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }

    /// Create a connected sink/receiver pair
    pub fn channel() -> (Self, Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn accept(&mut self, event: Event) {
        if self.tx.send(event).is_err() {
            warn!("event channel disconnected, dropping event");
        }
    }
}

/// Sink that forwards each event to every inner sink in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutSink {
    /// Create a fanout over the given sinks
    pub fn new(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Append another sink
    pub fn push(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for FanoutSink {
    fn accept(&mut self, event: Event) {
        for sink in &mut self.sinks {
            sink.accept(event.clone());
        }
    }
}
