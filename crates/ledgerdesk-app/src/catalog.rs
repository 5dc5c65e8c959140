// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    Masters,
    Inventory,
    Hr,
    CashBank,
    Financial,
    Sales,
    Purchasing,
    Meetings,
}

impl ModuleKind {
    pub const ALL: [Self; 8] = [
        Self::Masters,
        Self::Inventory,
        Self::Hr,
        Self::CashBank,
        Self::Financial,
        Self::Sales,
        Self::Purchasing,
        Self::Meetings,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Masters => "masters",
            Self::Inventory => "inventory",
            Self::Hr => "hr",
            Self::CashBank => "cash/bank",
            Self::Financial => "financial",
            Self::Sales => "sales",
            Self::Purchasing => "purchasing",
            Self::Meetings => "meetings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Customer,
    Supplier,
    Item,
    Warehouse,
    Employee,
    Department,
    BankAccount,
    LedgerAccount,
    SalesInvoice,
    PurchaseOrder,
    Meeting,
}

impl EntityKind {
    pub const ALL: [Self; 11] = [
        Self::Customer,
        Self::Supplier,
        Self::Item,
        Self::Warehouse,
        Self::Employee,
        Self::Department,
        Self::BankAccount,
        Self::LedgerAccount,
        Self::SalesInvoice,
        Self::PurchaseOrder,
        Self::Meeting,
    ];

    /// Path segment used by storage and the REST API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Supplier => "suppliers",
            Self::Item => "items",
            Self::Warehouse => "warehouses",
            Self::Employee => "employees",
            Self::Department => "departments",
            Self::BankAccount => "bank-accounts",
            Self::LedgerAccount => "ledger-accounts",
            Self::SalesInvoice => "sales-invoices",
            Self::PurchaseOrder => "purchase-orders",
            Self::Meeting => "meetings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "customers",
            Self::Supplier => "suppliers",
            Self::Item => "items",
            Self::Warehouse => "warehouses",
            Self::Employee => "employees",
            Self::Department => "departments",
            Self::BankAccount => "bank accts",
            Self::LedgerAccount => "ledger",
            Self::SalesInvoice => "invoices",
            Self::PurchaseOrder => "purchase orders",
            Self::Meeting => "meetings",
        }
    }

    pub const fn module(self) -> ModuleKind {
        match self {
            Self::Customer | Self::Supplier => ModuleKind::Masters,
            Self::Item | Self::Warehouse => ModuleKind::Inventory,
            Self::Employee | Self::Department => ModuleKind::Hr,
            Self::BankAccount => ModuleKind::CashBank,
            Self::LedgerAccount => ModuleKind::Financial,
            Self::SalesInvoice => ModuleKind::Sales,
            Self::PurchaseOrder => ModuleKind::Purchasing,
            Self::Meeting => ModuleKind::Meetings,
        }
    }

    pub const fn schema(self) -> EntitySchema {
        let columns = match self {
            Self::Customer => CUSTOMER_COLUMNS,
            Self::Supplier => SUPPLIER_COLUMNS,
            Self::Item => ITEM_COLUMNS,
            Self::Warehouse => WAREHOUSE_COLUMNS,
            Self::Employee => EMPLOYEE_COLUMNS,
            Self::Department => DEPARTMENT_COLUMNS,
            Self::BankAccount => BANK_ACCOUNT_COLUMNS,
            Self::LedgerAccount => LEDGER_ACCOUNT_COLUMNS,
            Self::SalesInvoice => SALES_INVOICE_COLUMNS,
            Self::PurchaseOrder => PURCHASE_ORDER_COLUMNS,
            Self::Meeting => MEETING_COLUMNS,
        };
        EntitySchema {
            kind: self,
            columns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Bool,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub default_visible: bool,
    pub sortable: bool,
    pub searchable: bool,
    pub required: bool,
}

impl ColumnDef {
    const fn new(key: &'static str, label: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            label,
            kind,
            default_visible: true,
            sortable: true,
            searchable: matches!(kind, ColumnKind::Text),
            required: false,
        }
    }

    const fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Text)
    }

    const fn integer(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Integer)
    }

    const fn decimal(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Decimal)
    }

    const fn flag(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Bool)
    }

    const fn date(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, ColumnKind::Date)
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    const fn unsorted(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub columns: &'static [ColumnDef],
}

impl EntitySchema {
    pub fn column(&self, key: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.key)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &'static ColumnDef> + '_ {
        self.columns.iter().filter(|column| column.required)
    }

    pub fn searchable_columns(&self) -> impl Iterator<Item = &'static ColumnDef> + '_ {
        self.columns.iter().filter(|column| column.searchable)
    }
}

const CUSTOMER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("code", "Code").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("contact", "Contact"),
    ColumnDef::text("phone", "Phone").unsorted(),
    ColumnDef::text("email", "Email").hidden(),
    ColumnDef::text("city", "City"),
    ColumnDef::decimal("credit_limit", "Credit limit").hidden(),
];

const SUPPLIER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("code", "Code").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("contact", "Contact"),
    ColumnDef::text("phone", "Phone").unsorted(),
    ColumnDef::text("tax_number", "Tax no.").hidden(),
    ColumnDef::integer("payment_terms_days", "Terms (days)"),
];

const ITEM_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("sku", "SKU").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("unit", "Unit"),
    ColumnDef::decimal("price", "Price"),
    ColumnDef::integer("on_hand", "On hand"),
    ColumnDef::text("image_url", "Image").hidden().unsorted(),
];

const WAREHOUSE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("code", "Code").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("location", "Location"),
    ColumnDef::integer("capacity", "Capacity"),
];

const EMPLOYEE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("employee_no", "Emp no.").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("department", "Department"),
    ColumnDef::text("designation", "Designation"),
    ColumnDef::date("joined_on", "Joined"),
    ColumnDef::text("phone", "Phone").hidden().unsorted(),
];

const DEPARTMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("code", "Code").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("head", "Head"),
];

const BANK_ACCOUNT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("account_no", "Account no.").required(),
    ColumnDef::text("bank", "Bank").required(),
    ColumnDef::text("branch", "Branch"),
    ColumnDef::text("currency", "Currency"),
    ColumnDef::decimal("opening_balance", "Opening bal.").hidden(),
];

const LEDGER_ACCOUNT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("code", "Code").required(),
    ColumnDef::text("name", "Name").required(),
    ColumnDef::text("group", "Group"),
    ColumnDef::flag("is_control", "Control"),
];

const SALES_INVOICE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("invoice_no", "Invoice no.").required(),
    ColumnDef::text("customer", "Customer").required(),
    ColumnDef::date("invoice_date", "Date").required(),
    ColumnDef::decimal("amount", "Amount"),
    ColumnDef::text("status", "Status"),
    ColumnDef::text("remarks", "Remarks").hidden().unsorted(),
];

const PURCHASE_ORDER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("po_no", "PO no.").required(),
    ColumnDef::text("supplier", "Supplier").required(),
    ColumnDef::date("order_date", "Date").required(),
    ColumnDef::decimal("amount", "Amount"),
    ColumnDef::text("status", "Status"),
];

const MEETING_COLUMNS: &[ColumnDef] = &[
    ColumnDef::text("title", "Title").required(),
    ColumnDef::date("meeting_date", "Date").required(),
    ColumnDef::text("venue", "Venue"),
    ColumnDef::text("organizer", "Organizer"),
    ColumnDef::text("minutes", "Minutes").hidden().unsorted(),
];
