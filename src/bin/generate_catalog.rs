//! Writes a deterministic sample catalog (`cosmetic_sample.csv` and
//! `cosmetic_sample.parquet`) for local experimentation with the viewer.

use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use glow_pick::{Product, SkinProfile, SkinType};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const KINDS: [&str; 6] = [
    "Moisturizer",
    "Serum",
    "Cleanser",
    "Sunscreen",
    "Toner",
    "Eye Cream",
];

const INGREDIENT_POOL: [&str; 10] = [
    "Water",
    "Glycerin",
    "Niacinamide",
    "Hyaluronic Acid",
    "Retinol",
    "Titanium Dioxide",
    "Squalane",
    "Ceramide NP",
    "Tocopherol",
    "Panthenol",
];

fn main() {
    let mut rng = SimpleRng::new(42);

    // Brand with its price band.
    let brands: [(&str, f64, f64); 5] = [
        ("Aveeno", 8.0, 25.0),
        ("CeraVe", 10.0, 30.0),
        ("Clinique", 25.0, 80.0),
        ("La Mer", 90.0, 350.0),
        ("The Ordinary", 5.0, 20.0),
    ];

    let mut products: Vec<Product> = Vec::new();

    for i in 0..120 {
        let (brand, price_lo, price_hi) = brands[rng.index(brands.len())];
        let kind = KINDS[rng.index(KINDS.len())];

        let price = ((price_lo + (price_hi - price_lo) * rng.next_f64()) * 100.0).round() / 100.0;
        let rank = 1 + rng.index(5) as i64;

        // A few records carry no ingredient data, like the real dataset.
        let ingredients = if rng.chance(0.05) {
            None
        } else {
            let count = 3 + rng.index(4);
            let mut picked: Vec<&str> = Vec::new();
            while picked.len() < count {
                let candidate = INGREDIENT_POOL[rng.index(INGREDIENT_POOL.len())];
                if !picked.contains(&candidate) {
                    picked.push(candidate);
                }
            }
            Some(picked.join(", "))
        };

        let mut skin = SkinProfile::default();
        for skin_type in SkinType::ALL {
            skin.set(skin_type, rng.chance(0.4));
        }

        products.push(Product {
            brand: brand.to_string(),
            name: format!("{brand} {kind} No. {}", i + 1),
            price,
            rank,
            ingredients,
            skin,
        });
    }

    write_csv(&products, "cosmetic_sample.csv");
    write_parquet(&products, "cosmetic_sample.parquet");

    println!(
        "Wrote {} products to cosmetic_sample.csv and cosmetic_sample.parquet",
        products.len()
    );
}

fn write_csv(products: &[Product], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");

    let mut header = vec!["brand", "name", "price", "rank", "ingredients"];
    header.extend(SkinType::ALL.iter().map(|t| t.column_name()));
    writer.write_record(&header).expect("Failed to write header");

    for p in products {
        let mut record = vec![
            p.brand.clone(),
            p.name.clone(),
            format!("{:.2}", p.price),
            p.rank.to_string(),
            p.ingredients.clone().unwrap_or_default(),
        ];
        for skin_type in SkinType::ALL {
            let flag = if p.skin.suits(skin_type) { "1" } else { "0" };
            record.push(flag.to_string());
        }
        writer.write_record(&record).expect("Failed to write record");
    }

    writer.flush().expect("Failed to flush CSV");
}

fn write_parquet(products: &[Product], path: &str) {
    let brand_array = StringArray::from(
        products.iter().map(|p| p.brand.as_str()).collect::<Vec<_>>(),
    );
    let name_array = StringArray::from(
        products.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
    );
    let price_array = Float64Array::from(products.iter().map(|p| p.price).collect::<Vec<_>>());
    let rank_array = Int64Array::from(products.iter().map(|p| p.rank).collect::<Vec<_>>());
    let ingredients_array = StringArray::from(
        products
            .iter()
            .map(|p| p.ingredients.as_deref())
            .collect::<Vec<_>>(),
    );

    let mut fields = vec![
        Field::new("brand", DataType::Utf8, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
        Field::new("rank", DataType::Int64, false),
        Field::new("ingredients", DataType::Utf8, true),
    ];
    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(brand_array),
        Arc::new(name_array),
        Arc::new(price_array),
        Arc::new(rank_array),
        Arc::new(ingredients_array),
    ];

    for skin_type in SkinType::ALL {
        let flags = BooleanArray::from(
            products
                .iter()
                .map(|p| p.skin.suits(skin_type))
                .collect::<Vec<_>>(),
        );
        fields.push(Field::new(skin_type.column_name(), DataType::Boolean, false));
        columns.push(Arc::new(flags));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}
