//! The [`World`] facade.
//!
//! The world owns the entity table, the scheduler, the event bus, the
//! command queue, the current level and the quit flag. One call to
//! [`World::update`] is one step:
//!
//! 1. Run every system's `update` in ascending priority.
//! 2. Drain the event bus, delivering each event to its subscribers.
//! 3. Drain the command queue, executing each command.
//! 4. Repeat 2–3 while handlers keep producing work (the settle loop).
//!
//! Events and commands produced during step 1 are therefore invisible to
//! every system until the pass is over. [`World::flush_now`] is the one
//! sanctioned exception.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use delve_component::{Component, ComponentTypeId, Entity, EntityId, QueryDescriptor, Tag};
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::command::{Command, CommandKind, CommandQueue, CommandRecord, RemoveEntity, SpawnEntity};
use crate::config::WorldConfig;
use crate::error::{Phase, WorldError};
use crate::event::{Event, EventBus, EventKind, EventRecord};
use crate::quit::QuitHandle;
use crate::scheduler::{Checkout, Scheduler};
use crate::system::{System, SystemId};
use crate::table::EntityTable;

/// What happened during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub tick_id: u64,
    /// Systems whose `update` ran.
    pub systems_run: usize,
    /// Events popped from the bus.
    pub events_delivered: usize,
    /// Commands executed, including built-in ones.
    pub commands_executed: usize,
    /// Commands skipped because their target entity was gone.
    pub stale_commands: usize,
    /// Event/command drain rounds, across the settle loop and any flushes.
    pub settle_rounds: usize,
    /// `flush_now` calls.
    pub flushes: usize,
}

/// Entity storage, scheduling and deferred messaging behind one object.
pub struct World {
    config: WorldConfig,
    entities: EntityTable,
    scheduler: Scheduler,
    events: EventBus,
    commands: CommandQueue,
    level: Option<Box<dyn Any>>,
    quit: QuitHandle,
    tick_id: u64,
    flush_depth: usize,
    report: StepReport,
}

impl World {
    /// Create an empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            config,
            entities: EntityTable::new(),
            scheduler: Scheduler::new(),
            events: EventBus::new(),
            commands: CommandQueue::new(),
            level: None,
            quit: QuitHandle::new(),
            tick_id: 0,
            flush_depth: 0,
            report: StepReport::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of steps started so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    // -- Entity lifecycle --

    /// Allocate a fresh, empty entity. It is not live until passed to
    /// [`World::add_entity`] (or queued with [`SpawnEntity`]).
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Make an entity live. Re-adding a live id replaces that entity.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        if self.entities.insert(entity).is_some() {
            debug!(tick_id = self.tick_id, entity = %id, "replaced live entity");
        } else {
            trace!(tick_id = self.tick_id, entity = %id, "entity added");
        }
        id
    }

    /// Remove an entity. Removing an id that is not live is a no-op.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id);
        if removed.is_some() {
            trace!(tick_id = self.tick_id, entity = %id, "entity removed");
        }
        removed
    }

    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    #[must_use]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Remove every entity, e.g. on a level transition.
    pub fn clear_entities(&mut self) -> usize {
        let removed = self.entities.clear();
        debug!(tick_id = self.tick_id, removed, "cleared entities");
        removed
    }

    // -- Queries --

    /// Ids of entities carrying every listed kind, in insertion order.
    /// An empty list selects every live entity.
    ///
    /// The result is a snapshot, so callers may mutate the world while
    /// walking it.
    #[must_use]
    pub fn query(&self, kinds: &[ComponentTypeId]) -> Vec<EntityId> {
        self.entities.query(kinds)
    }

    /// Borrowing form of [`World::query`] for read-only passes.
    pub fn query_iter<'a>(
        &'a self,
        kinds: &'a [ComponentTypeId],
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.query_iter(kinds)
    }

    #[must_use]
    pub fn query_with(&self, query: &QueryDescriptor) -> Vec<EntityId> {
        self.entities.query_with(query)
    }

    #[must_use]
    pub fn tagged(&self, tag: &Tag) -> Vec<EntityId> {
        self.entities.tagged(tag)
    }

    // -- Components and tags --

    /// Attach a component, returning the previous value of that kind.
    /// Does nothing if the entity is not live.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Option<C> {
        match self.entities.get_mut(id) {
            Some(entity) => entity.insert(component),
            None => {
                debug!(entity = %id, component = C::type_name(), "add_component on missing entity");
                None
            }
        }
    }

    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.entities.get(id)?.get::<C>()
    }

    #[must_use]
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.entities.get_mut(id)?.get_mut::<C>()
    }

    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::has::<C>)
    }

    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.entities.get_mut(id)?.remove::<C>()
    }

    /// Tag an entity. Returns `false` if it already had the tag or is not live.
    pub fn add_tag(&mut self, id: EntityId, tag: impl Into<Tag>) -> bool {
        self.entities
            .get_mut(id)
            .is_some_and(|entity| entity.add_tag(tag))
    }

    #[must_use]
    pub fn has_tag(&self, id: EntityId, tag: &Tag) -> bool {
        self.entities.get(id).is_some_and(|entity| entity.has_tag(tag))
    }

    pub fn remove_tag(&mut self, id: EntityId, tag: &Tag) -> bool {
        self.entities
            .get_mut(id)
            .is_some_and(|entity| entity.remove_tag(tag))
    }

    // -- Systems --

    /// Register a system. Lower priorities run first; equal priorities run
    /// in registration order. A system added during a step first runs on
    /// the next step.
    pub fn add_system(&mut self, system: impl System + 'static, priority: i32) -> SystemId {
        self.add_boxed_system(Box::new(system), priority)
    }

    pub fn add_boxed_system(&mut self, system: Box<dyn System>, priority: i32) -> SystemId {
        let name = system.name().to_string();
        let id = self.scheduler.add(system, priority);
        debug!(system = %name, %id, priority, "system registered");
        id
    }

    #[must_use]
    pub fn system_count(&self) -> usize {
        self.scheduler.len()
    }

    #[must_use]
    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.scheduler.name(id)
    }

    /// The interest descriptor a system declared at registration.
    #[must_use]
    pub fn system_interests(&self, id: SystemId) -> Option<&QueryDescriptor> {
        self.scheduler.interests(id)
    }

    /// System ids in execution order.
    #[must_use]
    pub fn system_order(&self) -> Vec<SystemId> {
        self.scheduler.order()
    }

    // -- Events --

    /// Subscribe a system to an event kind. Idempotent.
    pub fn subscribe(&mut self, kind: EventKind, system: SystemId) {
        if self.events.subscribe(kind, system) {
            trace!(%kind, %system, "subscribed");
        }
    }

    pub fn unsubscribe(&mut self, kind: EventKind, system: SystemId) -> bool {
        self.events.unsubscribe(kind, system)
    }

    /// Queue an event for delivery at the next drain.
    pub fn publish<E: Event>(&mut self, event: E) {
        self.publish_record(EventRecord::new(event));
    }

    /// Queue an untyped `(kind, payload)` event.
    pub fn publish_raw<P: Any + fmt::Debug>(&mut self, kind: EventKind, payload: P) {
        self.publish_record(EventRecord::raw(kind, payload));
    }

    fn publish_record(&mut self, record: EventRecord) {
        trace!(tick_id = self.tick_id, kind = %record.kind(), "event published");
        self.events.publish(record);
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.pending_len()
    }

    // -- Commands --

    /// Route a command kind to a system's `on_command`. Replaces any
    /// previous handler of that kind.
    pub fn handle_command(&mut self, kind: CommandKind, system: SystemId) {
        if let Some(previous) = self.commands.set_handler(kind, system) {
            debug!(%kind, %previous, %system, "command handler replaced");
        }
    }

    /// Queue a command for execution at the next command drain.
    pub fn queue_command<C: Command>(&mut self, command: C) {
        self.queue_record(CommandRecord::new(command));
    }

    /// Queue an untyped `(kind, payload)` command.
    pub fn queue_raw<P: Any + fmt::Debug>(
        &mut self,
        kind: CommandKind,
        target: Option<EntityId>,
        payload: P,
    ) {
        self.queue_record(CommandRecord::raw(kind, target, payload));
    }

    fn queue_record(&mut self, record: CommandRecord) {
        trace!(tick_id = self.tick_id, kind = %record.kind(), "command queued");
        self.commands.queue(record);
    }

    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.commands.pending_len()
    }

    // -- Level --

    /// Install the current level, returning the previous one.
    pub fn set_level<L: Any>(&mut self, level: L) -> Option<Box<dyn Any>> {
        debug!(tick_id = self.tick_id, level = std::any::type_name::<L>(), "level set");
        self.level.replace(Box::new(level))
    }

    /// The current level, if one is installed and it is an `L`.
    #[must_use]
    pub fn current_level<L: Any>(&self) -> Option<&L> {
        self.level.as_deref()?.downcast_ref::<L>()
    }

    #[must_use]
    pub fn current_level_mut<L: Any>(&mut self) -> Option<&mut L> {
        self.level.as_deref_mut()?.downcast_mut::<L>()
    }

    pub fn take_level(&mut self) -> Option<Box<dyn Any>> {
        self.level.take()
    }

    #[must_use]
    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    // -- Quit --

    pub fn request_quit(&self) {
        self.quit.request();
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.quit.is_requested()
    }

    /// A handle that can set the quit flag from another thread.
    #[must_use]
    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    // -- Step --

    /// Run one step: scheduler pass, event drain, command drain, settle.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError`] raised. The step is abandoned and any
    /// events or commands still queued are discarded.
    pub fn update(&mut self, dt: f64) -> Result<StepReport, WorldError> {
        self.tick_id += 1;
        self.report = StepReport {
            tick_id: self.tick_id,
            ..StepReport::default()
        };

        debug!(
            tick_id = self.tick_id,
            dt,
            systems = self.scheduler.len(),
            entities = self.entities.len(),
            "step start"
        );

        match self.run_step(dt) {
            Ok(()) => {
                let report = std::mem::take(&mut self.report);
                debug!(
                    tick_id = report.tick_id,
                    events = report.events_delivered,
                    commands = report.commands_executed,
                    stale = report.stale_commands,
                    rounds = report.settle_rounds,
                    "step complete"
                );
                Ok(report)
            }
            Err(err) => {
                self.abort_step(&err);
                Err(err)
            }
        }
    }

    fn run_step(&mut self, dt: f64) -> Result<(), WorldError> {
        for system in self.scheduler.order() {
            let Checkout::Ready(mut unit) = self.scheduler.checkout(system) else {
                continue;
            };
            trace!(tick_id = self.tick_id, system = unit.name(), "running system");
            let result = unit.update(self, dt);
            self.scheduler.restore(system, unit);
            result.map_err(|source| self.fault(system, Phase::Update, source))?;
            self.report.systems_run += 1;
        }
        self.settle()
    }

    fn abort_step(&mut self, err: &WorldError) {
        let discarded_events = self.events.clear();
        let discarded_commands = self.commands.clear();
        error!(
            tick_id = self.tick_id,
            error = %err,
            discarded_events,
            discarded_commands,
            "step aborted"
        );
    }

    /// Deliver pending events and execute pending commands right now.
    ///
    /// Intended for a system that must observe the consequences of what it
    /// just published before the step ends. Calls may nest (a handler may
    /// flush again) up to `max_flush_depth` levels, and at most
    /// `max_flushes_per_step` flushes run per step. A system is never
    /// re-entered: deliveries addressed to a system that is currently
    /// running are held and handed over at the next drain in which it is
    /// free.
    ///
    /// # Errors
    ///
    /// [`WorldError::FlushDepthExceeded`] or
    /// [`WorldError::FlushBudgetExhausted`] when a limit is hit, or any
    /// error raised by the drained handlers.
    pub fn flush_now(&mut self) -> Result<(), WorldError> {
        if self.flush_depth >= self.config.max_flush_depth {
            return Err(WorldError::FlushDepthExceeded {
                limit: self.config.max_flush_depth,
            });
        }
        if self.report.flushes >= self.config.max_flushes_per_step {
            return Err(WorldError::FlushBudgetExhausted {
                limit: self.config.max_flushes_per_step,
            });
        }
        self.report.flushes += 1;
        self.flush_depth += 1;
        debug!(tick_id = self.tick_id, depth = self.flush_depth, "flush_now");
        let result = self.settle();
        self.flush_depth -= 1;
        result
    }

    /// Alternate event and command drains until neither has work left.
    fn settle(&mut self) -> Result<(), WorldError> {
        let mut rounds = 0;
        loop {
            self.drain_events()?;
            self.drain_commands()?;
            rounds += 1;
            self.report.settle_rounds += 1;

            if !self.has_deliverable_work() {
                return Ok(());
            }
            if rounds >= self.config.max_settle_rounds {
                return Err(WorldError::Unsettled { rounds });
            }
        }
    }

    fn has_deliverable_work(&self) -> bool {
        // Held deliveries wait for a system further up the stack; only at
        // the top level are all systems free to take them.
        let held = self.flush_depth == 0 && (self.events.has_held() || self.commands.has_held());
        held || self.events.has_pending() || self.commands.has_pending()
    }

    /// Deliver every pending event, including events published by the
    /// handlers during this drain. Returns the number of events popped.
    ///
    /// # Errors
    ///
    /// [`WorldError::EventStorm`] past `max_events_per_drain`, or the first
    /// handler fault.
    pub fn drain_events(&mut self) -> Result<usize, WorldError> {
        for (system, event) in self.events.take_held() {
            self.deliver_event(system, &event)?;
        }

        let mut drained = 0;
        while let Some(event) = self.events.pop() {
            drained += 1;
            if drained > self.config.max_events_per_drain {
                return Err(WorldError::EventStorm {
                    limit: self.config.max_events_per_drain,
                    kind: event.kind(),
                });
            }
            self.report.events_delivered += 1;

            let subscribers = self.events.subscribers(event.kind()).to_vec();
            if subscribers.is_empty() {
                trace!(kind = %event.kind(), "event has no subscribers");
            }
            for system in subscribers {
                self.deliver_event(system, &event)?;
            }
        }
        Ok(drained)
    }

    fn deliver_event(&mut self, system: SystemId, event: &Rc<EventRecord>) -> Result<(), WorldError> {
        match self.scheduler.checkout(system) {
            Checkout::Ready(mut unit) => {
                let result = unit.on_event(self, event);
                self.scheduler.restore(system, unit);
                result.map_err(|source| self.fault(system, Phase::Event, source))
            }
            Checkout::Busy => {
                trace!(kind = %event.kind(), %system, "subscriber busy; holding event");
                self.events.hold(system, Rc::clone(event));
                Ok(())
            }
            Checkout::Unknown => {
                debug!(kind = %event.kind(), %system, "subscriber is not registered");
                Ok(())
            }
        }
    }

    /// Execute every queued command, including commands queued during this
    /// drain. Returns the number of commands popped.
    ///
    /// # Errors
    ///
    /// [`WorldError::CommandStorm`] past `max_commands_per_drain`, or the
    /// first handler fault.
    pub fn drain_commands(&mut self) -> Result<usize, WorldError> {
        for (system, command) in self.commands.take_held() {
            if self.target_is_live(&command) {
                self.dispatch_command(system, command)?;
            }
        }

        let mut drained = 0;
        while let Some(command) = self.commands.pop() {
            drained += 1;
            if drained > self.config.max_commands_per_drain {
                return Err(WorldError::CommandStorm {
                    limit: self.config.max_commands_per_drain,
                    kind: command.kind(),
                });
            }
            self.execute_command(command)?;
        }
        Ok(drained)
    }

    /// Whether a command may still run. A command naming a removed entity
    /// is counted as stale.
    fn target_is_live(&mut self, command: &CommandRecord) -> bool {
        let Some(target) = command.target() else {
            return true;
        };
        if self.entities.contains(target) {
            return true;
        }
        debug!(
            tick_id = self.tick_id,
            kind = %command.kind(),
            %target,
            "command target no longer exists; skipping"
        );
        self.report.stale_commands += 1;
        false
    }

    fn execute_command(&mut self, command: CommandRecord) -> Result<(), WorldError> {
        if !self.target_is_live(&command) {
            return Ok(());
        }

        let kind = command.kind();
        if kind == RemoveEntity::KIND {
            self.report.commands_executed += 1;
            match command.downcast::<RemoveEntity>() {
                Some(remove) => {
                    let id = remove.id;
                    self.remove_entity(id);
                }
                None => debug!(%kind, "remove_entity command with foreign payload ignored"),
            }
            return Ok(());
        }
        if kind == SpawnEntity::KIND {
            self.report.commands_executed += 1;
            match command.into_payload::<SpawnEntity>() {
                Ok(SpawnEntity(entity)) => {
                    self.add_entity(entity);
                }
                Err(_) => debug!(%kind, "spawn_entity command with foreign payload ignored"),
            }
            return Ok(());
        }

        match self.commands.handler(kind) {
            Some(system) => self.dispatch_command(system, command),
            None => {
                self.report.commands_executed += 1;
                trace!(%kind, "command has no handler");
                Ok(())
            }
        }
    }

    fn dispatch_command(&mut self, system: SystemId, command: CommandRecord) -> Result<(), WorldError> {
        match self.scheduler.checkout(system) {
            Checkout::Ready(mut unit) => {
                self.report.commands_executed += 1;
                let result = unit.on_command(self, &command);
                self.scheduler.restore(system, unit);
                result.map_err(|source| self.fault(system, Phase::Command, source))
            }
            Checkout::Busy => {
                trace!(kind = %command.kind(), %system, "handler busy; holding command");
                self.commands.hold(system, command);
                Ok(())
            }
            Checkout::Unknown => {
                debug!(kind = %command.kind(), %system, "command handler is not registered");
                Ok(())
            }
        }
    }

    fn fault(&self, system: SystemId, phase: Phase, source: anyhow::Error) -> WorldError {
        WorldError::SystemFault {
            system: self.scheduler.name(system).unwrap_or("<unregistered>").to_string(),
            phase,
            source,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("tick_id", &self.tick_id)
            .field("entities", &self.entities.len())
            .field("systems", &self.scheduler)
            .field("pending_events", &self.events.pending_len())
            .field("pending_commands", &self.commands.pending_len())
            .field("has_level", &self.level.is_some())
            .finish()
    }
}
