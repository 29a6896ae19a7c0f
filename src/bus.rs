//! In-process command dispatch keyed by the concrete command type.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    marker::PhantomData,
    sync::Arc,
};
use tokio::sync::RwLock;

use crate::{
    domain::Command,
    error::{ReleaseError, Result},
};

/// Handles one concrete command type.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> Result<()>;
}

/// Delivers commands to their registered handler.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseCommandBus: Send + Sync {
    /// Resolves when the handler has finished. Handler errors are returned
    /// to the sender.
    async fn send(&self, command: Box<dyn Command>) -> Result<()>;
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle_any(&self, command: Box<dyn Any + Send>) -> Result<()>;
}

struct HandlerAdapter<C, H> {
    handler: H,
    _command: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, H> ErasedHandler for HandlerAdapter<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle_any(&self, command: Box<dyn Any + Send>) -> Result<()> {
        let command = command
            .downcast::<C>()
            .map_err(|_| ReleaseError::UnregisteredCommand(type_name::<C>()))?;
        self.handler.handle(*command).await
    }
}

/// Bus holding exactly one handler per command type.
#[derive(Default)]
pub struct InMemoryReleaseCommandBus {
    handlers: RwLock<HashMap<TypeId, Arc<dyn ErasedHandler>>>,
}

impl InMemoryReleaseCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for `C`, replacing any previous one.
    pub async fn register<C, H>(&self, handler: H)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let adapter = HandlerAdapter {
            handler,
            _command: PhantomData::<fn(C)>,
        };

        let replaced = self
            .handlers
            .write()
            .await
            .insert(TypeId::of::<C>(), Arc::new(adapter))
            .is_some();

        if replaced {
            debug!("replaced handler for {}", type_name::<C>());
        } else {
            debug!("registered handler for {}", type_name::<C>());
        }
    }
}

#[async_trait]
impl ReleaseCommandBus for InMemoryReleaseCommandBus {
    async fn send(&self, command: Box<dyn Command>) -> Result<()> {
        let name = command.message_type();
        debug!("dispatching {name} ({})", command.message_id());

        let command = command.into_any();
        let type_id = (*command).type_id();

        let handler = self
            .handlers
            .read()
            .await
            .get(&type_id)
            .cloned()
            .ok_or(ReleaseError::UnregisteredCommand(name))?;

        handler.handle_any(command).await
    }
}
