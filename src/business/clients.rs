use serde::{Deserialize, Serialize};
use tracing::debug;
use trackforge_common::{Client, ClientDraft, ClientPatch, new_id, now_timestamp};

use crate::board::{NoOp, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientChange {
    Insert(Client),
    Update(Client),
    Delete { id: String },
}

/// Clients in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientBook {
    clients: Vec<Client>,
}

impl ClientBook {
    pub fn from_clients(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn into_clients(self) -> Vec<Client> {
        self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn add(&mut self, draft: ClientDraft) -> Client {
        let client = draft.into_client(new_id(), now_timestamp());
        debug!(id = %client.id, "client added");
        self.clients.push(client.clone());
        client
    }

    pub fn update(&mut self, id: &str, patch: &ClientPatch) -> Outcome {
        if patch.is_empty() {
            return Outcome::Unchanged(NoOp::EmptyPatch);
        }
        match self.clients.iter_mut().find(|c| c.id == id) {
            Some(client) => {
                patch.apply_to(client);
                Outcome::Applied
            }
            None => {
                debug!(id, "client update ignored: unknown id");
                Outcome::Unchanged(NoOp::UnknownId)
            }
        }
    }

    /// Remove a client. Projects referring to it keep their `clientId`.
    pub fn delete(&mut self, id: &str) -> Outcome {
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        if self.clients.len() == before {
            debug!(id, "client delete ignored: unknown id");
            Outcome::Unchanged(NoOp::UnknownId)
        } else {
            Outcome::Applied
        }
    }

    pub fn replay(&mut self, change: &ClientChange) {
        match change {
            ClientChange::Insert(client) | ClientChange::Update(client) => {
                match self.clients.iter_mut().find(|c| c.id == client.id) {
                    Some(existing) => *existing = client.clone(),
                    None if matches!(change, ClientChange::Insert(_)) => {
                        self.clients.push(client.clone())
                    }
                    None => {}
                }
            }
            ClientChange::Delete { id } => self.clients.retain(|c| &c.id != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> ClientDraft {
        ClientDraft {
            name: "Acme Corp".into(),
            email: "contact@acme.com".into(),
            company: "Acme Corporation".into(),
            notes: None,
        }
    }

    #[test]
    fn test_add_update_delete_client() {
        let mut book = ClientBook::default();
        let client = book.add(acme());
        assert_eq!(book.len(), 1);

        let outcome = book.update(
            &client.id,
            &ClientPatch {
                notes: Some("Yearly renewal".into()),
                ..Default::default()
            },
        );
        assert_eq!(outcome, Outcome::Applied);
        let updated = book.get(&client.id).unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Yearly renewal"));
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.created_at, client.created_at);

        assert_eq!(book.delete(&client.id), Outcome::Applied);
        assert_eq!(book.delete(&client.id), Outcome::Unchanged(NoOp::UnknownId));
        assert!(book.is_empty());
    }

    #[test]
    fn test_replay_update_of_missing_client_is_ignored() {
        let mut source = ClientBook::default();
        let client = source.add(acme());

        let mut mirror = ClientBook::default();
        mirror.replay(&ClientChange::Update(client.clone()));
        assert!(mirror.is_empty());

        mirror.replay(&ClientChange::Insert(client.clone()));
        mirror.replay(&ClientChange::Insert(client));
        assert_eq!(mirror.len(), 1);
    }
}
