use sea_orm_migration::{prelude::*, schema::*};

/// Ontario cities served at launch, with approximate coordinates.
const ONTARIO_CITIES: &[(&str, f64, f64)] = &[
    ("Toronto", 43.6532, -79.3832),
    ("Ottawa", 45.4215, -75.6972),
    ("Mississauga", 43.5890, -79.6441),
    ("Hamilton", 43.2557, -79.8711),
    ("Brampton", 43.7315, -79.7624),
    ("London", 42.9849, -81.2453),
    ("Markham", 43.8561, -79.3370),
    ("Vaughan", 43.8563, -79.5085),
    ("Kitchener", 43.4643, -80.5204),
    ("Windsor", 42.3149, -83.0364),
    ("Richmond Hill", 43.8828, -79.4403),
    ("Oakville", 43.4675, -79.6877),
    ("Burlington", 43.3255, -79.7990),
    ("Oshawa", 43.8971, -78.8658),
    ("Barrie", 44.3894, -79.6903),
    ("Guelph", 43.5448, -80.2482),
    ("Kingston", 44.2312, -76.4860),
    ("Cambridge", 43.3616, -80.3144),
    ("Waterloo", 43.4643, -80.5204),
    ("Sudbury", 46.4917, -80.9930),
    ("Thunder Bay", 48.3809, -89.2477),
    ("St. Catharines", 43.1594, -79.2469),
    ("Sault Ste. Marie", 46.5197, -84.3456),
    ("Sarnia", 42.9994, -82.4066),
    ("Peterborough", 44.3106, -78.3197),
    ("Niagara Falls", 43.0962, -79.0377),
    ("North Bay", 46.3091, -79.4608),
    ("Welland", 42.9918, -79.2648),
    ("Brantford", 43.1394, -80.2644),
    ("Timmins", 48.4758, -81.3304),
    ("Chatham", 42.4048, -82.1910),
    ("Belleville", 44.1628, -77.3832),
    ("Cornwall", 45.0212, -74.7307),
    ("Orillia", 44.6084, -79.4197),
    ("Stratford", 43.3701, -80.9821),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(City::Table)
                    .if_not_exists()
                    .col(pk_auto(City::Id))
                    .col(string_len(City::Name, 100).not_null().unique_key())
                    .col(string_len(City::Province, 50).not_null())
                    .col(string_len(City::Country, 50).not_null())
                    .col(double_null(City::Latitude))
                    .col(double_null(City::Longitude))
                    .col(boolean(City::IsActive).not_null().default(true))
                    .to_owned(),
            )
            .await?;

        // Seed the serviceable city list
        let mut insert = Query::insert()
            .into_table(City::Table)
            .columns([
                City::Name,
                City::Province,
                City::Country,
                City::Latitude,
                City::Longitude,
                City::IsActive,
            ])
            .to_owned();

        for (name, lat, lng) in ONTARIO_CITIES {
            insert.values_panic([
                (*name).into(),
                "Ontario".into(),
                "Canada".into(),
                (*lat).into(),
                (*lng).into(),
                true.into(),
            ]);
        }

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(City::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum City {
    Table,
    Id,
    Name,
    Province,
    Country,
    Latitude,
    Longitude,
    IsActive,
}
