//! Hosting many games over one shared world.
//!
//! The engine assumes exclusive access for the length of a call. The host
//! gives each game its own async mutex, applies one engine call at a time
//! under it, and saves the snapshot before letting go, so every successful
//! call is durable and calls to different games never block each other.

pub mod errors;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::engine::{Command, Game, GameState, PlayResult, World};
use crate::logutil::escape_log;
use crate::validation;

pub use errors::HostError;
pub use store::{SaveRecord, SaveStore};

/// A loaded game. `deleted` is set under the lock by [`GameHost::delete_game`]
/// so callers already queued on the lock neither play nor save it.
struct Slot {
    game: Game,
    deleted: bool,
}

type Instance = Arc<Mutex<Slot>>;

pub struct GameHost {
    world: Arc<World>,
    store: SaveStore,
    games: RwLock<HashMap<String, Instance>>,
    allow_cheats: bool,
}

impl GameHost {
    pub fn new(world: Arc<World>, store: SaveStore) -> Self {
        Self {
            world,
            store,
            games: RwLock::new(HashMap::new()),
            allow_cheats: false,
        }
    }

    pub fn with_cheats(mut self, allow: bool) -> Self {
        self.allow_cheats = allow;
        self
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Create and save a new game, returning its id.
    pub async fn create_game(&self, goal: Option<usize>) -> Result<String, HostError> {
        let id = Uuid::new_v4().to_string();
        let game = Game::new(Arc::clone(&self.world), goal).with_cheats(self.allow_cheats);
        self.persist(&id, &game)?;

        let slot = Slot {
            game,
            deleted: false,
        };
        self.games
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(slot)));
        info!("created game {}", id);
        Ok(id)
    }

    /// The live instance for `id`, loading it from the store on first use.
    async fn instance(&self, id: &str) -> Result<Instance, HostError> {
        validation::check_game_id(id)?;

        if let Some(slot) = self.games.read().await.get(id) {
            return Ok(Arc::clone(slot));
        }

        // delete_game holds this lock too
        let mut games = self.games.write().await;
        if let Some(slot) = games.get(id) {
            return Ok(Arc::clone(slot));
        }

        let record = self.store.get(id)?;
        let game = Game::from_json(Arc::clone(&self.world), &record.document)?;
        info!("loaded game {} saved at {}", id, record.saved_at);

        let slot = Arc::new(Mutex::new(Slot {
            game,
            deleted: false,
        }));
        games.insert(id.to_string(), Arc::clone(&slot));
        Ok(slot)
    }

    /// Run `f` on the game under its lock, saving afterwards when `save` is
    /// set and `f` succeeded.
    async fn with_game<T>(
        &self,
        id: &str,
        instance: &Instance,
        save: bool,
        f: impl FnOnce(&mut Game) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        let mut slot = instance.lock().await;
        if slot.deleted {
            return Err(HostError::NotFound(id.to_string()));
        }
        let out = f(&mut slot.game)?;
        if save {
            self.persist(id, &slot.game)?;
        }
        Ok(out)
    }

    fn persist(&self, id: &str, game: &Game) -> Result<(), HostError> {
        let document = game.to_json()?;
        let record = self.store.put(id, document)?;
        debug!("saved game {} at {}", id, record.saved_at);
        Ok(())
    }

    pub async fn add_player(&self, id: &str, name: &str, colour: &str) -> Result<(), HostError> {
        let instance = self.instance(id).await?;
        self.with_game(id, &instance, true, |game| Ok(game.add_player(name, colour)?))
            .await?;
        info!("{} joined game {}", escape_log(name), id);
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<(), HostError> {
        let instance = self.instance(id).await?;
        self.with_game(id, &instance, true, |game| Ok(game.start()?))
            .await
    }

    pub async fn play(
        &self,
        id: &str,
        player: &str,
        command: &Command,
    ) -> Result<PlayResult, HostError> {
        let instance = self.instance(id).await?;
        self.with_game(id, &instance, true, |game| Ok(game.play(player, command)?))
            .await
    }

    pub async fn state(&self, id: &str) -> Result<GameState, HostError> {
        let instance = self.instance(id).await?;
        self.with_game(id, &instance, false, |game| Ok(game.state()))
            .await
    }

    /// The saved snapshot document of a game.
    pub async fn export(&self, id: &str) -> Result<String, HostError> {
        let instance = self.instance(id).await?;
        self.with_game(id, &instance, false, |game| Ok(game.to_json()?))
            .await
    }

    pub async fn list_games(&self) -> Result<Vec<String>, HostError> {
        self.store.list_ids()
    }

    /// Forget a game, live and saved. Returns whether it existed.
    ///
    /// Holds the map's write lock throughout, so no load can bring the game
    /// back, and waits for any call already running on the game to finish.
    pub async fn delete_game(&self, id: &str) -> Result<bool, HostError> {
        validation::check_game_id(id)?;

        let mut games = self.games.write().await;
        let live = match games.remove(id) {
            Some(instance) => {
                instance.lock().await.deleted = true;
                true
            }
            None => false,
        };
        let saved = self.store.delete(id)?;
        drop(games);

        if live || saved {
            info!("deleted game {}", id);
        }
        Ok(live || saved)
    }
}
