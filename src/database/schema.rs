//! DDL for the inventory tables, applied by `Database::ensure_schema` when a table is missing.

pub const TABLES: [(&str, &str); 5] = [
    ("suppliers", CREATE_SUPPLIERS),
    ("warehouses", CREATE_WAREHOUSES),
    ("products", CREATE_PRODUCTS),
    ("orders", CREATE_ORDERS),
    ("order_items", CREATE_ORDER_ITEMS),
];

const CREATE_SUPPLIERS: &str = r#"
    CREATE TABLE suppliers (
        id UNIQUEIDENTIFIER NOT NULL PRIMARY KEY,
        name NVARCHAR(255) NOT NULL,
        contact_person NVARCHAR(255) NULL,
        email NVARCHAR(255) NULL,
        phone NVARCHAR(64) NULL,
        address NVARCHAR(512) NULL,
        status NVARCHAR(32) NOT NULL,
        rating FLOAT NOT NULL DEFAULT 0,
        credit_limit FLOAT NOT NULL DEFAULT 0,
        current_balance FLOAT NOT NULL DEFAULT 0,
        payment_terms INT NOT NULL DEFAULT 30,
        created_at DATETIME2 NOT NULL,
        updated_at DATETIME2 NOT NULL
    )
"#;

const CREATE_WAREHOUSES: &str = r#"
    CREATE TABLE warehouses (
        id UNIQUEIDENTIFIER NOT NULL PRIMARY KEY,
        name NVARCHAR(255) NOT NULL,
        location NVARCHAR(512) NOT NULL,
        capacity INT NOT NULL DEFAULT 0,
        current_occupancy INT NOT NULL DEFAULT 0,
        status NVARCHAR(32) NOT NULL,
        manager_id UNIQUEIDENTIFIER NULL,
        contact_email NVARCHAR(255) NULL,
        contact_phone NVARCHAR(64) NULL,
        created_at DATETIME2 NOT NULL,
        updated_at DATETIME2 NOT NULL
    )
"#;

const CREATE_PRODUCTS: &str = r#"
    CREATE TABLE products (
        id UNIQUEIDENTIFIER NOT NULL PRIMARY KEY,
        sku NVARCHAR(64) NOT NULL CONSTRAINT uq_products_sku UNIQUE,
        name NVARCHAR(255) NOT NULL,
        description NVARCHAR(MAX) NULL,
        price FLOAT NOT NULL DEFAULT 0,
        cost_price FLOAT NOT NULL DEFAULT 0,
        quantity INT NOT NULL DEFAULT 0,
        reserved_quantity INT NOT NULL DEFAULT 0,
        min_stock_level INT NOT NULL DEFAULT 0,
        max_stock_level INT NOT NULL DEFAULT 0,
        category NVARCHAR(100) NULL,
        supplier_id UNIQUEIDENTIFIER NULL,
        warehouse_id UNIQUEIDENTIFIER NULL,
        total_sold INT NOT NULL DEFAULT 0,
        total_revenue FLOAT NOT NULL DEFAULT 0,
        status NVARCHAR(32) NOT NULL,
        created_at DATETIME2 NOT NULL,
        updated_at DATETIME2 NOT NULL
    )
"#;

const CREATE_ORDERS: &str = r#"
    CREATE TABLE orders (
        id UNIQUEIDENTIFIER NOT NULL PRIMARY KEY,
        order_number NVARCHAR(64) NOT NULL CONSTRAINT uq_orders_number UNIQUE,
        status NVARCHAR(32) NOT NULL,
        order_type NVARCHAR(32) NOT NULL,
        payment_status NVARCHAR(32) NOT NULL,
        supplier_id UNIQUEIDENTIFIER NULL,
        warehouse_id UNIQUEIDENTIFIER NULL,
        user_id UNIQUEIDENTIFIER NULL,
        subtotal FLOAT NOT NULL DEFAULT 0,
        tax_amount FLOAT NOT NULL DEFAULT 0,
        shipping_cost FLOAT NOT NULL DEFAULT 0,
        discount_amount FLOAT NOT NULL DEFAULT 0,
        total_amount FLOAT NOT NULL DEFAULT 0,
        paid_amount FLOAT NOT NULL DEFAULT 0,
        order_date DATETIME2 NOT NULL,
        due_date DATETIME2 NULL,
        shipped_date DATETIME2 NULL,
        delivered_date DATETIME2 NULL,
        priority NVARCHAR(16) NOT NULL,
        is_rush_order BIT NOT NULL DEFAULT 0,
        notes NVARCHAR(MAX) NULL,
        created_at DATETIME2 NOT NULL,
        updated_at DATETIME2 NOT NULL
    )
"#;

const CREATE_ORDER_ITEMS: &str = r#"
    CREATE TABLE order_items (
        id UNIQUEIDENTIFIER NOT NULL PRIMARY KEY,
        order_id UNIQUEIDENTIFIER NOT NULL,
        product_id UNIQUEIDENTIFIER NOT NULL,
        quantity INT NOT NULL,
        unit_price FLOAT NOT NULL,
        created_at DATETIME2 NOT NULL,
        updated_at DATETIME2 NOT NULL
    )
"#;
