use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::ProfileType;
use crate::validation::validate_hex_color;

pub const DEFAULT_CATEGORY_ICON: &str = "folder";
pub const DEFAULT_CATEGORY_COLOR: &str = "#064E3B";
pub const DEFAULT_SUBCATEGORY_ICON: &str = "tag";

/// Classification of a transaction or category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Expense,
    Income,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Expense => f.write_str("expense"),
            EntryType::Income => f.write_str("income"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
}

/// Category entity, owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub entry_type: EntryType,
    pub subcategories: Vec<Subcategory>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn subcategory(&self, id: Uuid) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Groceries", "icon": "shopping-cart"}))]
pub struct CreateSubcategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    pub icon: Option<String>,
}

impl CreateSubcategoryRequest {
    pub fn into_subcategory(self) -> Subcategory {
        Subcategory {
            id: Uuid::new_v4(),
            name: self.name,
            icon: self
                .icon
                .unwrap_or_else(|| DEFAULT_SUBCATEGORY_ICON.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Food & Dining",
    "icon": "utensils",
    "color": "#F59E0B",
    "entry_type": "expense",
    "subcategories": [{"name": "Groceries", "icon": "shopping-cart"}]
}))]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub icon: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,

    pub entry_type: Option<EntryType>,

    #[validate(nested)]
    #[serde(default)]
    pub subcategories: Vec<CreateSubcategoryRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    pub icon: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

/// Seed entry for the categories created at registration
pub struct CategoryTemplate {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub entry_type: EntryType,
    pub subcategories: &'static [(&'static str, &'static str)],
}

const SALARIED: &[CategoryTemplate] = &[
    CategoryTemplate {
        name: "Housing",
        icon: "home",
        color: "#064E3B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Rent/Mortgage", "building"),
            ("Utilities", "zap"),
            ("Maintenance", "wrench"),
        ],
    },
    CategoryTemplate {
        name: "Transportation",
        icon: "car",
        color: "#10B981",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Fuel", "fuel"),
            ("Public Transit", "train"),
            ("Parking", "parking-square"),
        ],
    },
    CategoryTemplate {
        name: "Food & Dining",
        icon: "utensils",
        color: "#F59E0B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Groceries", "shopping-cart"),
            ("Restaurants", "chef-hat"),
            ("Coffee & Snacks", "coffee"),
        ],
    },
    CategoryTemplate {
        name: "Healthcare",
        icon: "heart-pulse",
        color: "#EF4444",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Medical", "stethoscope"),
            ("Pharmacy", "pill"),
            ("Insurance", "shield"),
        ],
    },
    CategoryTemplate {
        name: "Entertainment",
        icon: "gamepad-2",
        color: "#8B5CF6",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Streaming", "tv"),
            ("Events", "ticket"),
            ("Hobbies", "palette"),
        ],
    },
    CategoryTemplate {
        name: "Salary",
        icon: "wallet",
        color: "#0EA5E9",
        entry_type: EntryType::Income,
        subcategories: &[("Paycheck", "banknote"), ("Bonus", "gift")],
    },
];

const SELF_EMPLOYED: &[CategoryTemplate] = &[
    CategoryTemplate {
        name: "Business Operations",
        icon: "briefcase",
        color: "#064E3B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Software & Tools", "laptop"),
            ("Office Supplies", "paperclip"),
            ("Marketing", "megaphone"),
        ],
    },
    CategoryTemplate {
        name: "Professional Services",
        icon: "users",
        color: "#10B981",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Legal", "scale"),
            ("Accounting", "calculator"),
            ("Consulting", "message-circle"),
        ],
    },
    CategoryTemplate {
        name: "Travel & Client Meetings",
        icon: "plane",
        color: "#F59E0B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Flights", "plane-takeoff"),
            ("Hotels", "bed"),
            ("Meals", "utensils"),
        ],
    },
    CategoryTemplate {
        name: "Personal Expenses",
        icon: "user",
        color: "#8B5CF6",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Groceries", "shopping-cart"),
            ("Healthcare", "heart-pulse"),
            ("Entertainment", "gamepad-2"),
        ],
    },
    CategoryTemplate {
        name: "Client Income",
        icon: "wallet",
        color: "#0EA5E9",
        entry_type: EntryType::Income,
        subcategories: &[("Invoices", "receipt"), ("Retainers", "handshake")],
    },
];

const BUSINESSMAN: &[CategoryTemplate] = &[
    CategoryTemplate {
        name: "Operations",
        icon: "factory",
        color: "#064E3B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Raw Materials", "box"),
            ("Manufacturing", "cog"),
            ("Logistics", "truck"),
        ],
    },
    CategoryTemplate {
        name: "Human Resources",
        icon: "users",
        color: "#10B981",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Salaries", "wallet"),
            ("Benefits", "gift"),
            ("Training", "graduation-cap"),
        ],
    },
    CategoryTemplate {
        name: "Marketing & Sales",
        icon: "trending-up",
        color: "#F59E0B",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Advertising", "megaphone"),
            ("Events & Trade Shows", "calendar"),
            ("Client Entertainment", "wine"),
        ],
    },
    CategoryTemplate {
        name: "Infrastructure",
        icon: "building-2",
        color: "#8B5CF6",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Rent & Lease", "home"),
            ("Equipment", "hard-drive"),
            ("IT Systems", "server"),
        ],
    },
    CategoryTemplate {
        name: "Finance & Legal",
        icon: "landmark",
        color: "#EF4444",
        entry_type: EntryType::Expense,
        subcategories: &[
            ("Taxes", "receipt"),
            ("Insurance", "shield"),
            ("Legal Fees", "scale"),
        ],
    },
    CategoryTemplate {
        name: "Revenue",
        icon: "trending-up",
        color: "#0EA5E9",
        entry_type: EntryType::Income,
        subcategories: &[("Sales", "shopping-bag"), ("Investments", "piggy-bank")],
    },
];

/// Categories every new user of the given profile type starts with
pub fn default_categories(profile_type: ProfileType) -> &'static [CategoryTemplate] {
    match profile_type {
        ProfileType::Salaried => SALARIED,
        ProfileType::SelfEmployed => SELF_EMPLOYED,
        ProfileType::Businessman => BUSINESSMAN,
    }
}

impl CategoryTemplate {
    pub fn instantiate(&self, user_id: Uuid, created_at: DateTime<Utc>) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id,
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            color: self.color.to_string(),
            entry_type: self.entry_type,
            subcategories: self
                .subcategories
                .iter()
                .map(|(name, icon)| Subcategory {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    icon: icon.to_string(),
                })
                .collect(),
            created_at,
        }
    }
}
