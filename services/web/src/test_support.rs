//! services/web/src/test_support.rs
//!
//! In-memory stand-ins for the backend and the session store.

use async_trait::async_trait;
use deep_purple_core::domain::{
    Communication, CommunicationDraft, Credentials, EmotionCategory, EmotionDetails,
    LoginResponse, Model, Role, UploadRequest, User, UserDraft, WordAssociation,
};
use deep_purple_core::ports::{
    AuthService, CommunicationService, EmotionService, ModelService, PortError, PortResult,
    SessionStore, UserAdminService,
};
use deep_purple_core::session::PersistedSession;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemorySessionStore {
    pub saved: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn current(&self) -> Option<PersistedSession> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> PortResult<Option<PersistedSession>> {
        Ok(self.current())
    }

    async fn save(&self, session: &PersistedSession) -> PortResult<()> {
        *self.saved.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

/// A backend holding its records in memory. Logging in as `admin` yields
/// the admin role, any other username the user role; the password `wrong`
/// is always rejected. Every call is recorded as `METHOD /path`.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub users: Mutex<Vec<User>>,
    pub models: Mutex<Vec<Model>>,
    pub categories: Mutex<Vec<EmotionCategory>>,
    pub associations: Mutex<Vec<WordAssociation>>,
    pub communications: Mutex<Vec<Communication>>,
}

impl FakeBackend {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    pub fn with_communications(self, communications: Vec<Communication>) -> Self {
        *self.communications.lock().unwrap() = communications;
        self
    }
}

pub fn user(id: i64, username: &str, role: Role) -> User {
    User {
        id,
        username: username.to_string(),
        password: format!("{username}-pw"),
        role,
    }
}

pub fn communication(primary: &str, secondary: &[&str]) -> Communication {
    Communication {
        primary_emotion: Some(EmotionDetails::new(primary, 60.0)),
        secondary_emotions: Some(
            secondary
                .iter()
                .map(|label| EmotionDetails::new(label, 20.0))
                .collect(),
        ),
        ..Communication::default()
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginResponse> {
        self.record("POST /users/login");
        if credentials.password == "wrong" {
            return Err(PortError::Unauthorized);
        }
        let role = if credentials.username == "admin" {
            Role::Admin
        } else {
            Role::User
        };
        Ok(LoginResponse { role, token: None })
    }

    async fn register(&self, _credentials: &Credentials) -> PortResult<()> {
        self.record("POST /users/register");
        Ok(())
    }
}

#[async_trait]
impl UserAdminService for FakeBackend {
    async fn list_users(&self) -> PortResult<Vec<User>> {
        self.record("GET /admin");
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, draft: &UserDraft) -> PortResult<User> {
        self.record("POST /admin/create");
        let mut users = self.users.lock().unwrap();
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created = User {
            id,
            username: draft.username.clone(),
            password: draft.password.clone(),
            role: draft.role,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: i64, draft: &UserDraft) -> PortResult<User> {
        self.record(format!("PUT /admin/{id}"));
        Ok(User {
            id,
            username: draft.username.clone(),
            password: draft.password.clone(),
            role: draft.role,
        })
    }

    async fn delete_user(&self, id: i64) -> PortResult<()> {
        self.record(format!("DELETE /admin/{id}"));
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(PortError::NotFound(format!("/admin/{id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelService for FakeBackend {
    async fn list_models(&self) -> PortResult<Vec<Model>> {
        self.record("GET /models");
        Ok(self.models.lock().unwrap().clone())
    }

    async fn create_model(&self, name: &str) -> PortResult<Model> {
        self.record(format!("POST /models?name={name}"));
        let mut models = self.models.lock().unwrap();
        let model = Model {
            id: models.iter().map(|m| m.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            predefined: false,
        };
        models.push(model.clone());
        Ok(model)
    }

    async fn delete_model(&self, id: i64) -> PortResult<()> {
        self.record(format!("DELETE /models/{id}"));
        self.models.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }
}

#[async_trait]
impl EmotionService for FakeBackend {
    async fn list_categories(&self, model_id: i64) -> PortResult<Vec<EmotionCategory>> {
        self.record(format!("GET /emotion/category?modelId={model_id}"));
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.model_id == Some(model_id))
            .cloned()
            .collect())
    }

    async fn list_all_categories(&self) -> PortResult<Vec<EmotionCategory>> {
        self.record("GET /emotion/emotion-categories");
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn create_category(&self, model_id: i64, name: &str) -> PortResult<EmotionCategory> {
        self.record(format!("POST /emotion/category?modelId={model_id}&name={name}"));
        let mut categories = self.categories.lock().unwrap();
        let category = EmotionCategory {
            id: categories.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            emotion: name.to_string(),
            model_id: Some(model_id),
            predefined: false,
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, name: &str) -> PortResult<EmotionCategory> {
        self.record(format!("PUT /emotion/category/{id}?name={name}"));
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("/emotion/category/{id}")))?;
        category.emotion = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> PortResult<()> {
        self.record(format!("DELETE /emotion/category/{id}"));
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(PortError::NotFound(format!("/emotion/category/{id}")));
        }
        Ok(())
    }

    async fn list_associations(&self, model_id: i64) -> PortResult<Vec<WordAssociation>> {
        self.record(format!("GET /emotion/word-associations/{model_id}"));
        Ok(self
            .associations
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.emotion_category
                    .as_ref()
                    .is_some_and(|c| c.model_id == Some(model_id))
            })
            .cloned()
            .collect())
    }

    async fn create_association(
        &self,
        word: &str,
        emotion_category_id: i64,
    ) -> PortResult<WordAssociation> {
        self.record(format!(
            "POST /emotion/word-association?word={word}&emotionCategoryId={emotion_category_id}"
        ));
        let category = self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == emotion_category_id)
            .cloned();
        let mut associations = self.associations.lock().unwrap();
        let association = WordAssociation {
            id: associations.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            word: word.to_string(),
            emotion_category: category,
            predefined: false,
        };
        associations.push(association.clone());
        Ok(association)
    }

    async fn delete_association(&self, id: i64) -> PortResult<()> {
        self.record(format!("DELETE /emotion/word-association/{id}"));
        let mut associations = self.associations.lock().unwrap();
        let before = associations.len();
        associations.retain(|a| a.id != id);
        if associations.len() == before {
            return Err(PortError::NotFound(format!("/emotion/word-association/{id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CommunicationService for FakeBackend {
    async fn save(&self, draft: &CommunicationDraft) -> PortResult<Communication> {
        self.record("POST /communications");
        Ok(Communication {
            id: Some(1),
            content: Some(draft.content.clone()),
            model_name: Some(draft.model_name.clone()),
            ..communication("joy", &["surprise"])
        })
    }

    async fn update(&self, id: i64, draft: &CommunicationDraft) -> PortResult<Communication> {
        self.record(format!("PUT /communications/{id}"));
        Ok(Communication {
            id: Some(id),
            content: Some(draft.content.clone()),
            model_name: Some(draft.model_name.clone()),
            ..Communication::default()
        })
    }

    async fn delete(&self, id: i64) -> PortResult<()> {
        self.record(format!("DELETE /communications/{id}"));
        Ok(())
    }

    async fn get(&self, id: i64) -> PortResult<Communication> {
        self.record(format!("GET /communications/{id}"));
        Ok(Communication {
            id: Some(id),
            content: Some("stored text".to_string()),
            ..Communication::default()
        })
    }

    async fn list(&self) -> PortResult<Vec<Communication>> {
        self.record("GET /communications");
        Ok(self.communications.lock().unwrap().clone())
    }

    async fn upload(&self, request: UploadRequest) -> PortResult<Communication> {
        self.record(format!("POST /communications/upload {}", request.file_name));
        Ok(Communication {
            model_name: Some(request.model_name),
            ..communication("calm", &[])
        })
    }
}
