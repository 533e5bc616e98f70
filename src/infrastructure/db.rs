use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

// Cascade policy, made explicit:
// - client-owned rows (vlans, vrfs, networks, lines) and all join tables CASCADE
// - ips follow their asset (CASCADE) and their network (CASCADE at the storage
//   level; the network service refuses to delete a populated network)
// - networks.vrf_id is NO ACTION, so a VRF with member networks cannot be deleted
//   directly while a client delete still removes both in one statement
// - optional descriptive references are SET NULL
const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        permissions TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        surname TEXT,
        email TEXT,
        address TEXT,
        phone_number TEXT,
        movil_number TEXT,
        comment TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contact_clients (
        contact_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (contact_id, client_id),
        FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        company_type TEXT NOT NULL UNIQUE,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        address TEXT,
        phone_number TEXT,
        fax_number TEXT,
        comment TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_clients (
        company_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (company_id, client_id),
        FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_contacts (
        company_id INTEGER NOT NULL,
        contact_id INTEGER NOT NULL,
        PRIMARY KEY (company_id, contact_id),
        FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
        FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS company_company_types (
        company_id INTEGER NOT NULL,
        company_type_id INTEGER NOT NULL,
        PRIMARY KEY (company_id, company_type_id),
        FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
        FOREIGN KEY (company_type_id) REFERENCES company_types(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sites (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS site_clients (
        site_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (site_id, client_id),
        FOREIGN KEY (site_id) REFERENCES sites(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS host_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS network_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vlans (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        provider_id INTEGER,
        number INTEGER NOT NULL,
        name TEXT NOT NULL,
        comment TEXT,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (client_id, number),
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE,
        FOREIGN KEY (provider_id) REFERENCES companies(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vrfs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        rd TEXT NOT NULL,
        comment TEXT,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (client_id, name),
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dns_server_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        comment TEXT,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dns_servers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ip_address TEXT NOT NULL UNIQUE,
        name TEXT,
        comment TEXT,
        description TEXT,
        disabled BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dns_server_clients (
        dns_server_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (dns_server_id, client_id),
        FOREIGN KEY (dns_server_id) REFERENCES dns_servers(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS network_column_hierarchy (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        column_name TEXT NOT NULL UNIQUE,
        level INTEGER NOT NULL CHECK (level >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS networks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        vlan_id INTEGER,
        dns_server_group_id INTEGER,
        site_id INTEGER,
        category_id INTEGER,
        vrf_id INTEGER,
        rd_vrf_id INTEGER,
        ip_address TEXT NOT NULL,
        mask INTEGER NOT NULL DEFAULT 24,
        ip_version INTEGER NOT NULL CHECK (ip_version IN (4, 6)),
        rootnet BOOLEAN NOT NULL DEFAULT 0,
        utilization INTEGER NOT NULL DEFAULT 0,
        description TEXT,
        comment TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE,
        FOREIGN KEY (vlan_id) REFERENCES vlans(id) ON DELETE SET NULL,
        FOREIGN KEY (dns_server_group_id) REFERENCES dns_server_groups(id) ON DELETE SET NULL,
        FOREIGN KEY (site_id) REFERENCES sites(id) ON DELETE SET NULL,
        FOREIGN KEY (category_id) REFERENCES network_categories(id) ON DELETE SET NULL,
        FOREIGN KEY (vrf_id) REFERENCES vrfs(id) ON DELETE NO ACTION,
        FOREIGN KEY (rd_vrf_id) REFERENCES vrfs(id) ON DELETE SET NULL
    )
    "#,
    // NULL vrf_id would defeat a plain UNIQUE constraint
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS ux_networks_scope
        ON networks (client_id, IFNULL(vrf_id, 0), ip_address, mask)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS ix_networks_hierarchy
        ON networks (client_id, vrf_id, ip_version)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS snmp_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        version INTEGER NOT NULL DEFAULT 2,
        comment TEXT,
        community TEXT,
        security_level TEXT,
        auth_algorithm TEXT,
        auth_password TEXT,
        priv_algorithm TEXT,
        priv_password TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS snmp_group_clients (
        snmp_group_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (snmp_group_id, client_id),
        FOREIGN KEY (snmp_group_id) REFERENCES snmp_groups(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS manufacturers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        image TEXT,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS operating_systems (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        image TEXT,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        image TEXT,
        comment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        site_id INTEGER,
        hostname TEXT,
        category_id INTEGER,
        snmp_group_id INTEGER,
        manufacturer_id INTEGER,
        os_id INTEGER,
        serial_number TEXT,
        comment TEXT,
        description TEXT,
        descr_snmp TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (site_id) REFERENCES sites(id) ON DELETE SET NULL,
        FOREIGN KEY (category_id) REFERENCES host_categories(id) ON DELETE SET NULL,
        FOREIGN KEY (snmp_group_id) REFERENCES snmp_groups(id) ON DELETE SET NULL,
        FOREIGN KEY (manufacturer_id) REFERENCES manufacturers(id) ON DELETE SET NULL,
        FOREIGN KEY (os_id) REFERENCES operating_systems(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS asset_clients (
        asset_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (asset_id, client_id),
        FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        network_id INTEGER NOT NULL,
        asset_id INTEGER,
        site_id INTEGER,
        category_id INTEGER,
        snmp_group_id INTEGER,
        manufacturer_id INTEGER,
        os_id INTEGER,
        ip_address TEXT NOT NULL,
        hostname TEXT,
        dns_name TEXT,
        domain TEXT,
        cnames TEXT,
        mac TEXT,
        serial_number TEXT,
        description TEXT,
        comment TEXT,
        url TEXT,
        if_alias TEXT,
        if_descr TEXT,
        cm_enabled BOOLEAN NOT NULL DEFAULT 0,
        ping_status BOOLEAN,
        ping_last_checked TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (network_id, ip_address),
        FOREIGN KEY (network_id) REFERENCES networks(id) ON DELETE CASCADE,
        FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
        FOREIGN KEY (site_id) REFERENCES sites(id) ON DELETE SET NULL,
        FOREIGN KEY (category_id) REFERENCES host_categories(id) ON DELETE SET NULL,
        FOREIGN KEY (snmp_group_id) REFERENCES snmp_groups(id) ON DELETE SET NULL,
        FOREIGN KEY (manufacturer_id) REFERENCES manufacturers(id) ON DELETE SET NULL,
        FOREIGN KEY (os_id) REFERENCES operating_systems(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS linked_ips (
        ip_id_a INTEGER NOT NULL,
        ip_id_b INTEGER NOT NULL,
        PRIMARY KEY (ip_id_a, ip_id_b),
        CHECK (ip_id_a < ip_id_b),
        FOREIGN KEY (ip_id_a) REFERENCES ips(id) ON DELETE CASCADE,
        FOREIGN KEY (ip_id_b) REFERENCES ips(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        provider_id INTEGER,
        phone_number TEXT,
        number INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL UNIQUE,
        comment TEXT,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE,
        FOREIGN KEY (provider_id) REFERENCES companies(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS custom_tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag TEXT NOT NULL UNIQUE,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tagged_items (
        tag_id INTEGER NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id INTEGER NOT NULL,
        PRIMARY KEY (tag_id, entity_type, entity_id),
        FOREIGN KEY (tag_id) REFERENCES custom_tags(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS ix_tagged_items_entity
        ON tagged_items (entity_type, entity_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS eav_attributes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entity_type TEXT NOT NULL,
        name TEXT NOT NULL,
        datatype TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (entity_type, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS eav_values (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        attribute_id INTEGER NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id INTEGER NOT NULL,
        value_text TEXT,
        value_float REAL,
        value_int INTEGER,
        value_date TEXT,
        value_bool BOOLEAN,
        updated_at TEXT NOT NULL,
        UNIQUE (attribute_id, entity_id),
        FOREIGN KEY (attribute_id) REFERENCES eav_attributes(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS ix_eav_values_entity
        ON eav_values (entity_type, entity_id)
    "#,
];

// Fixtures the application expects to exist on a fresh install
const FIXTURES: &[&str] = &[
    r#"
    INSERT OR IGNORE INTO clients (id, name, created_at, updated_at)
    VALUES (1, 'DEFAULT', datetime('now'), datetime('now'))
    "#,
    r#"
    INSERT OR IGNORE INTO host_categories (name) VALUES
        ('db'), ('fw'), ('server'), ('router'), ('switch'), ('workstation'), ('printer')
    "#,
    r#"
    INSERT OR IGNORE INTO network_categories (name) VALUES
        ('prod'), ('pre'), ('dev'), ('test')
    "#,
    r#"
    INSERT OR IGNORE INTO company_types (company_type) VALUES
        ('provider'), ('consulting'), ('supplier'), ('maintenance')
    "#,
];

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Foreign keys are on by default with sqlx, but be explicit for other pools
    execute(db, "PRAGMA foreign_keys = ON").await?;

    for sql in TABLES {
        execute(db, sql).await?;
    }

    for sql in FIXTURES {
        execute(db, sql).await?;
    }

    tracing::debug!("Schema ready ({} statements)", TABLES.len() + FIXTURES.len());
    Ok(())
}
