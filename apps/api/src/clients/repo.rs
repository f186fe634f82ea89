use std::cmp::Ordering;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clients::scoring::initial_score;
use crate::errors::AppError;
use crate::listing::{contains_ci, paginate, OffsetPage, SortOrder};
use crate::models::clamp_percent;
use crate::models::client::{Client, ClientStatus, ContactInfo};
use crate::store::{new_id, Store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub status: Option<String>,
    pub industry: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ClientFilters {
    pub status: String,
    pub industry: String,
    pub search: String,
}

#[derive(Debug)]
pub struct ClientPage {
    pub clients: Vec<Client>,
    pub pagination: OffsetPage,
    pub filters: ClientFilters,
}

/// Matches the free-text search used by both the client list and global search.
pub fn matches_search(client: &Client, needle_lower: &str) -> bool {
    contains_ci(&client.name, needle_lower)
        || contains_ci(&client.company, needle_lower)
        || contains_ci(&client.industry, needle_lower)
        || contains_ci(&client.description, needle_lower)
}

fn compare(sort_by: &str, a: &Client, b: &Client) -> Ordering {
    let text = |c: &Client| -> String {
        match sort_by {
            "name" => c.name.to_lowercase(),
            "company" => c.company.to_lowercase(),
            "industry" => c.industry.to_lowercase(),
            "location" => c.location.to_lowercase(),
            "status" => c.status.as_str().to_string(),
            "lastContact" => c.last_contact.to_lowercase(),
            "dealPotential" => c.deal_potential.to_lowercase(),
            _ => String::new(),
        }
    };
    match sort_by {
        "createdAt" => a.created_at.cmp(&b.created_at),
        "updatedAt" => a.updated_at.cmp(&b.updated_at),
        "name" | "company" | "industry" | "location" | "status" | "lastContact"
        | "dealPotential" => text(a).cmp(&text(b)),
        _ => a.score.cmp(&b.score),
    }
}

pub fn list(store: &Store, query: &ClientQuery) -> ClientPage {
    let industry = query.industry.as_deref().map(str::to_lowercase);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut clients: Vec<Client> = store
        .clients
        .read()
        .iter()
        .filter(|c| query.status.as_deref().map_or(true, |s| c.status.as_str() == s))
        .filter(|c| industry.as_deref().map_or(true, |i| contains_ci(&c.industry, i)))
        .filter(|c| search.as_deref().map_or(true, |s| matches_search(c, s)))
        .cloned()
        .collect();

    let sort_by = query.sort_by.as_deref().unwrap_or("score");
    let order = SortOrder::parse(query.sort_order.as_deref());
    clients.sort_by(|a, b| order.apply(compare(sort_by, a, b)));

    let (clients, pagination) = paginate(
        clients,
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    );

    ClientPage {
        clients,
        pagination,
        filters: ClientFilters {
            status: query.status.clone().unwrap_or_else(|| "all".to_string()),
            industry: query.industry.clone().unwrap_or_else(|| "all".to_string()),
            search: search.unwrap_or_default(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub revenue: Option<String>,
    pub employees: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<ContactInput>,
    pub deal_potential: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub fn create(store: &Store, input: NewClient) -> Result<Client, AppError> {
    let (Some(name), Some(company), Some(industry)) = (
        non_empty(input.name),
        non_empty(input.company),
        non_empty(input.industry),
    ) else {
        return Err(AppError::Validation(
            "Name, company, and industry are required".to_string(),
        ));
    };

    let contact = input.contact_info.unwrap_or_default();
    let Some(email) = non_empty(contact.email) else {
        return Err(AppError::Validation("Contact email is required".to_string()));
    };

    let score = initial_score(input.deal_potential.as_deref(), input.revenue.as_deref());
    let now = Utc::now();
    let client = Client {
        id: new_id(),
        name,
        company,
        industry,
        location: non_empty(input.location).unwrap_or_else(|| "Not specified".to_string()),
        revenue: non_empty(input.revenue).unwrap_or_else(|| "Not disclosed".to_string()),
        employees: non_empty(input.employees).unwrap_or_else(|| "Not disclosed".to_string()),
        description: input.description.unwrap_or_default(),
        contact_info: ContactInfo {
            email,
            phone: contact.phone.unwrap_or_default(),
            website: contact.website.unwrap_or_default(),
        },
        score,
        status: ClientStatus::Warm,
        last_contact: "Never".to_string(),
        deal_potential: non_empty(input.deal_potential).unwrap_or_else(|| "TBD".to_string()),
        tags: input.tags.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    // Uniqueness check and insert under one write lock.
    let mut clients = store.clients.write();
    if clients.iter().any(|c| c.has_email(&client.contact_info.email)) {
        return Err(duplicate_email());
    }
    clients.push(client.clone());
    Ok(client)
}

pub fn get(store: &Store, id: &str) -> Result<Client, AppError> {
    store
        .clients
        .read()
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub revenue: Option<String>,
    pub employees: Option<String>,
    pub description: Option<String>,
    pub deal_potential: Option<String>,
    pub status: Option<ClientStatus>,
    pub score: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub contact_info: Option<ContactInput>,
}

pub fn update(store: &Store, id: &str, patch: ClientPatch) -> Result<Client, AppError> {
    let mut clients = store.clients.write();
    let index = clients.iter().position(|c| c.id == id).ok_or_else(not_found)?;

    let new_email = patch
        .contact_info
        .as_ref()
        .and_then(|c| c.email.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty() && !clients[index].has_email(e));
    if let Some(email) = new_email {
        if clients
            .iter()
            .any(|c| c.id != id && c.has_email(email))
        {
            return Err(duplicate_email());
        }
    }

    let client = &mut clients[index];
    if let Some(v) = patch.name {
        client.name = v;
    }
    if let Some(v) = patch.company {
        client.company = v;
    }
    if let Some(v) = patch.industry {
        client.industry = v;
    }
    if let Some(v) = patch.location {
        client.location = v;
    }
    if let Some(v) = patch.revenue {
        client.revenue = v;
    }
    if let Some(v) = patch.employees {
        client.employees = v;
    }
    if let Some(v) = patch.description {
        client.description = v;
    }
    if let Some(v) = patch.deal_potential {
        client.deal_potential = v;
    }
    if let Some(v) = patch.status {
        client.status = v;
    }
    if let Some(v) = patch.score {
        client.score = clamp_percent(v);
    }
    if let Some(v) = patch.tags {
        client.tags = v;
    }
    if let Some(contact) = patch.contact_info {
        if let Some(email) = non_empty(contact.email) {
            client.contact_info.email = email;
        }
        if let Some(phone) = contact.phone {
            client.contact_info.phone = phone;
        }
        if let Some(website) = contact.website {
            client.contact_info.website = website;
        }
    }
    client.last_contact = "Recently updated".to_string();
    client.updated_at = Utc::now();

    Ok(client.clone())
}

pub fn delete(store: &Store, id: &str) -> Result<Client, AppError> {
    let mut clients = store.clients.write();
    let index = clients.iter().position(|c| c.id == id).ok_or_else(not_found)?;
    Ok(clients.remove(index))
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound("Client not found".to_string())
}

fn duplicate_email() -> AppError {
    AppError::Conflict("Client with this email already exists".to_string())
}
