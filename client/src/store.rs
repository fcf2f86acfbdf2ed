use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Administrator identity, owned and written by the hosting application.
/// The connection layer only ever reads it.
#[derive(Debug, Default)]
pub struct AdminStore {
    administrator_id: RwLock<Option<String>>,
}

impl AdminStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_administrator_id(&self, id: impl Into<String>) {
        *write(&self.administrator_id) = Some(id.into());
    }

    pub fn clear(&self) {
        *write(&self.administrator_id) = None;
    }

    pub fn administrator_id(&self) -> Option<String> {
        read(&self.administrator_id).clone()
    }
}

/// Participant identity, owned and written by the hosting application.
/// The connection layer only ever reads it.
#[derive(Debug, Default)]
pub struct UserStore {
    user_id: RwLock<Option<String>>,
    nickname: RwLock<Option<String>>,
    room_code: RwLock<Option<String>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_id(&self, id: impl Into<String>) {
        *write(&self.user_id) = Some(id.into());
    }

    pub fn set_nickname(&self, nickname: impl Into<String>) {
        *write(&self.nickname) = Some(nickname.into());
    }

    pub fn set_room_code(&self, code: impl Into<String>) {
        *write(&self.room_code) = Some(code.into());
    }

    pub fn clear(&self) {
        *write(&self.user_id) = None;
        *write(&self.nickname) = None;
        *write(&self.room_code) = None;
    }

    pub fn user_id(&self) -> Option<String> {
        read(&self.user_id).clone()
    }

    pub fn nickname(&self) -> Option<String> {
        read(&self.nickname).clone()
    }

    pub fn room_code(&self) -> Option<String> {
        read(&self.room_code).clone()
    }
}

fn read(lock: &RwLock<Option<String>>) -> RwLockReadGuard<'_, Option<String>> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write(lock: &RwLock<Option<String>>) -> RwLockWriteGuard<'_, Option<String>> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
