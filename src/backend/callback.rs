use crate::context::BenchContext;
use crate::error::{BackendError, ConfigError};

use super::KvBackend;

type EnvSetupFn = Box<dyn FnMut()>;
type OpenFn<H> = Box<dyn FnMut(&BenchContext<'_, H>) -> Result<H, BackendError>>;
type CloseFn<H> = Box<dyn FnMut(&mut BenchContext<'_, H>) -> Result<(), BackendError>>;
type PutFn<H> =
    Box<dyn FnMut(&mut BenchContext<'_, H>, &[u8], &[u8], bool) -> Result<(), BackendError>>;
type GetFn<H> =
    Box<dyn FnMut(&mut BenchContext<'_, H>, &[u8], &mut Vec<u8>) -> Result<bool, BackendError>>;
type DelFn<H> = Box<dyn FnMut(&mut BenchContext<'_, H>, &[u8]) -> Result<bool, BackendError>>;
type ReadSeqFn<H> = Box<dyn FnMut(&mut BenchContext<'_, H>, bool) -> Result<(), BackendError>>;

/// Collects backend capabilities one closure at a time.
///
/// [`BackendBuilder::build`] refuses to produce a backend until every
/// capability is bound, naming the first one that is missing. `env_setup` is
/// optional.
pub struct BackendBuilder<H> {
    name: String,
    env_setup: Option<EnvSetupFn>,
    open: Option<OpenFn<H>>,
    close: Option<CloseFn<H>>,
    put: Option<PutFn<H>>,
    get: Option<GetFn<H>>,
    del: Option<DelFn<H>>,
    read_seq: Option<ReadSeqFn<H>>,
    cursor_to_key: Option<GetFn<H>>,
}

impl<H> BackendBuilder<H> {
    pub fn new(name: impl Into<String>) -> Self {
        BackendBuilder {
            name: name.into(),
            env_setup: None,
            open: None,
            close: None,
            put: None,
            get: None,
            del: None,
            read_seq: None,
            cursor_to_key: None,
        }
    }

    pub fn env_setup<F>(mut self, f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.env_setup = Some(Box::new(f));
        self
    }

    pub fn open<F>(mut self, f: F) -> Self
    where
        F: FnMut(&BenchContext<'_, H>) -> Result<H, BackendError> + 'static,
    {
        self.open = Some(Box::new(f));
        self
    }

    pub fn close<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>) -> Result<(), BackendError> + 'static,
    {
        self.close = Some(Box::new(f));
        self
    }

    pub fn put<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>, &[u8], &[u8], bool) -> Result<(), BackendError>
            + 'static,
    {
        self.put = Some(Box::new(f));
        self
    }

    pub fn get<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>, &[u8], &mut Vec<u8>) -> Result<bool, BackendError>
            + 'static,
    {
        self.get = Some(Box::new(f));
        self
    }

    pub fn del<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>, &[u8]) -> Result<bool, BackendError> + 'static,
    {
        self.del = Some(Box::new(f));
        self
    }

    pub fn read_seq<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>, bool) -> Result<(), BackendError> + 'static,
    {
        self.read_seq = Some(Box::new(f));
        self
    }

    pub fn cursor_to_key<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut BenchContext<'_, H>, &[u8], &mut Vec<u8>) -> Result<bool, BackendError>
            + 'static,
    {
        self.cursor_to_key = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<CallbackBackend<H>, ConfigError> {
        let Self {
            name,
            env_setup,
            open,
            close,
            put,
            get,
            del,
            read_seq,
            cursor_to_key,
        } = self;
        Ok(CallbackBackend {
            name,
            env_setup,
            open: open.ok_or(ConfigError::MissingCapability("db_open"))?,
            close: close.ok_or(ConfigError::MissingCapability("db_close"))?,
            put: put.ok_or(ConfigError::MissingCapability("db_put"))?,
            get: get.ok_or(ConfigError::MissingCapability("db_get"))?,
            del: del.ok_or(ConfigError::MissingCapability("db_del"))?,
            read_seq: read_seq.ok_or(ConfigError::MissingCapability("db_read_seq"))?,
            cursor_to_key: cursor_to_key
                .ok_or(ConfigError::MissingCapability("db_cursor_to_key"))?,
        })
    }
}

/// A backend whose capabilities are closures. Only obtainable through
/// [`BackendBuilder::build`], so every capability is present.
pub struct CallbackBackend<H> {
    name: String,
    env_setup: Option<EnvSetupFn>,
    open: OpenFn<H>,
    close: CloseFn<H>,
    put: PutFn<H>,
    get: GetFn<H>,
    del: DelFn<H>,
    read_seq: ReadSeqFn<H>,
    cursor_to_key: GetFn<H>,
}

impl<H> KvBackend for CallbackBackend<H> {
    type Handle = H;

    fn name(&self) -> &str {
        &self.name
    }

    fn env_setup(&mut self) {
        if let Some(f) = self.env_setup.as_mut() {
            f();
        }
    }

    fn open(&mut self, ctx: &BenchContext<'_, H>) -> Result<H, BackendError> {
        (self.open)(ctx)
    }

    fn close(&mut self, ctx: &mut BenchContext<'_, H>) -> Result<(), BackendError> {
        (self.close)(ctx)
    }

    fn put(
        &mut self,
        ctx: &mut BenchContext<'_, H>,
        key: &[u8],
        value: &[u8],
        sync: bool,
    ) -> Result<(), BackendError> {
        (self.put)(ctx, key, value, sync)
    }

    fn get(
        &mut self,
        ctx: &mut BenchContext<'_, H>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        (self.get)(ctx, key, value)
    }

    fn cursor_to_key(
        &mut self,
        ctx: &mut BenchContext<'_, H>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        (self.cursor_to_key)(ctx, key, value)
    }

    fn delete(
        &mut self,
        ctx: &mut BenchContext<'_, H>,
        key: &[u8],
    ) -> Result<bool, BackendError> {
        (self.del)(ctx, key)
    }

    fn read_seq(
        &mut self,
        ctx: &mut BenchContext<'_, H>,
        reverse: bool,
    ) -> Result<(), BackendError> {
        (self.read_seq)(ctx, reverse)
    }
}
