//! Scripted stand-ins for the external services, shared by the
//! pipeline integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use atelier_services::{
    BackgroundRemoval, ImageSynthesis, ObjectStorage, RemoteTraining, ServiceError,
    SynthesisRequest, TextGeneration, TrainingParams, TrainingService,
};

/// Text generation that replays a fixed script, repeating the last entry
/// once the script runs out. Counts every call.
pub struct ScriptedTextGen {
    replies: Vec<String>,
    pub calls: AtomicUsize,
}

impl ScriptedTextGen {
    pub fn new(replies: &[&str]) -> Self {
        assert!(!replies.is_empty(), "script needs at least one reply");
        Self {
            replies: replies.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGeneration for ScriptedTextGen {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _image_url: Option<&str>,
    ) -> Result<String, ServiceError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(index)
            .unwrap_or_else(|| self.replies.last().unwrap());
        Ok(reply.clone())
    }
}

/// Image synthesis that records every request and returns fixed URLs.
pub struct RecordingSynthesizer {
    pub requests: Mutex<Vec<SynthesisRequest>>,
    outputs: Vec<String>,
}

impl RecordingSynthesizer {
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ImageSynthesis for RecordingSynthesizer {
    async fn generate(&self, request: &SynthesisRequest) -> Result<Vec<String>, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.outputs.clone())
    }
}

/// In-memory object storage recording every put.
pub struct MemoryStorage {
    /// (name, content_type) per stored object.
    pub objects: Mutex<Vec<(String, String)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        name: &str,
        _bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ServiceError> {
        self.objects
            .lock()
            .unwrap()
            .push((name.to_string(), content_type.to_string()));
        Ok(self.public_url(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!("https://storage.test/{name}")
    }
}

/// Background removal returning a valid tiny PNG, or failing on demand.
pub struct StubRemover {
    fail: bool,
    png: Vec<u8>,
}

impl StubRemover {
    pub fn ok() -> Self {
        Self {
            fail: false,
            png: tiny_png(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            png: Vec::new(),
        }
    }
}

#[async_trait]
impl BackgroundRemoval for StubRemover {
    async fn remove(&self, _image_url: &str) -> Result<Vec<u8>, ServiceError> {
        if self.fail {
            return Err(ServiceError::Api {
                status: 500,
                body: "model exploded".to_string(),
            });
        }
        Ok(self.png.clone())
    }
}

/// Training service with a scripted remote state.
pub struct StubTrainer {
    fail_submit: bool,
    pub submits: Mutex<Vec<String>>,
    /// `None` simulates an unreachable service on `get`.
    pub remote: Mutex<Option<RemoteTraining>>,
}

impl StubTrainer {
    pub fn new() -> Self {
        Self {
            fail_submit: false,
            submits: Mutex::new(Vec::new()),
            remote: Mutex::new(None),
        }
    }

    pub fn failing_submit() -> Self {
        Self {
            fail_submit: true,
            ..Self::new()
        }
    }

    pub fn set_remote(&self, remote: RemoteTraining) {
        *self.remote.lock().unwrap() = Some(remote);
    }

    pub fn submit_count(&self) -> usize {
        self.submits.lock().unwrap().len()
    }
}

#[async_trait]
impl TrainingService for StubTrainer {
    async fn submit(
        &self,
        archive_url: &str,
        _params: &TrainingParams,
    ) -> Result<String, ServiceError> {
        if self.fail_submit {
            return Err(ServiceError::Api {
                status: 503,
                body: "no gpus".to_string(),
            });
        }
        self.submits.lock().unwrap().push(archive_url.to_string());
        Ok("ext-training-1".to_string())
    }

    async fn get(&self, _external_id: &str) -> Result<RemoteTraining, ServiceError> {
        match self.remote.lock().unwrap().clone() {
            Some(remote) => Ok(remote),
            None => Err(ServiceError::Api {
                status: 503,
                body: "unreachable".to_string(),
            }),
        }
    }
}

/// A 1x1 PNG for stub removal output.
pub fn tiny_png() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        1,
        1,
        image::Rgb([255, 255, 255]),
    ));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}
