//! Demonstration driver for the klass object model.
//!
//! Usage:
//!   klass                       # Run the demo
//!   klass --identity            # Number instances in their display
//!   klass --config klass.toml   # Load settings from a file

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser as ClapParser;
use log::info;

use klass::runtime::ds::function_object::arg_or_nil;
use klass::runtime::ds::operations::operators::{self, Operator};
use klass::{
    call, class_of, define, is_instance_of, is_subclass_of, name_of, new_function, new_table,
    ClassHandle, KErrorType, KValue, ModelConfig,
};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, help = "Show per-class identity numbers on instances")]
    identity: bool,

    #[arg(long, help = "Read settings from a klass.toml file")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ModelConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => ModelConfig::new(),
    };
    if cli.identity {
        config.identity_display = true;
    }

    let default_level = config.log_level.clone().unwrap_or_else(|| "warn".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    config.apply();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    animals()?;
    vectors()?;
    errors();
    Ok(())
}

fn this_instance(this: &KValue) -> Result<klass::InstanceHandle, KErrorType> {
    match this.as_instance() {
        Some(i) => Ok(i.clone()),
        None => Err(KErrorType::TypeError(format!(
            "expected an instance receiver, got {}",
            this.type_name()
        ))),
    }
}

fn animals() -> Result<(), KErrorType> {
    info!("animal chain");
    let animal = define(
        "Animal",
        Some(new_table(vec![
            (
                "new",
                new_function("Animal.new", |this, args| {
                    let this = this_instance(&this)?;
                    this.set("name", arg_or_nil(&args, 0))?;
                    this.set("legs", KValue::from(4))?;
                    Ok(KValue::Nil)
                }),
            ),
            (
                "describe",
                new_function("Animal.describe", |this, _| {
                    let this = this_instance(&this)?;
                    Ok(KValue::from(format!(
                        "{} ({} legs) says {}",
                        this.get("name"),
                        this.get("legs"),
                        this.get("sound")
                    )))
                }),
            ),
            ("sound", KValue::from("...")),
        ])),
    )?;

    let dog = define("Dog", Some(KValue::Class(animal.clone())))?;
    dog.set(
        "new",
        new_function("Dog.new", |this, _| {
            let this = this_instance(&this)?;
            this.set("sound", KValue::from("woof"))?;
            Ok(KValue::Nil)
        }),
    )?;

    let puppy = define("Puppy", Some(KValue::Class(dog.clone())))?;
    puppy.set(
        "new",
        new_function("Puppy.new", |this, args| {
            let this = this_instance(&this)?;
            let name = this.get("name");
            this.set("name", KValue::from(format!("little {}", name)))?;
            this.set("age", arg_or_nil(&args, 1))?;
            Ok(KValue::Nil)
        }),
    )?;

    println!("{}", animal);
    println!("{}", dog);
    println!("{}", puppy);

    let rex = call(&KValue::Class(dog.clone()), vec![KValue::from("Rex")])?;
    let bit = call(&KValue::Class(puppy.clone()), vec![KValue::from("Bit"), KValue::from(1)])?;
    for pet in &[&rex, &bit] {
        let instance = this_instance(pet)?;
        println!("{} -> {}", pet, instance.send("describe", vec![])?);
    }

    let bit_instance = this_instance(&bit)?;
    println!("super of {} is {}", bit, bit_instance.get("super"));
    println!(
        "Puppy is a subclass of Animal: {}",
        is_subclass_of(&KValue::Class(puppy.clone()), &KValue::Class(animal.clone()))
    );
    println!(
        "class of {} is {}",
        bit,
        class_of(&bit).map(|c| c.to_string()).unwrap_or_default()
    );
    println!("{} is an Animal: {}", bit, is_instance_of(&bit, &animal));
    println!("name of {} is {}", rex, name_of(&rex).unwrap_or_default());

    // chainNew = false: only QuietDog.new runs, so no sound or legs.
    let quiet = define("QuietDog", Some(KValue::Class(dog.clone())))?;
    quiet.set("chainNew", KValue::from(false))?;
    quiet.set(
        "new",
        new_function("QuietDog.new", |this, args| {
            let this = this_instance(&this)?;
            this.set("name", arg_or_nil(&args, 0))?;
            Ok(KValue::Nil)
        }),
    )?;
    let shh = call(&KValue::Class(quiet), vec![KValue::from("Shh")])?;
    let shh_instance = this_instance(&shh)?;
    println!("{} -> {}", shh, shh_instance.send("describe", vec![])?);
    Ok(())
}

fn vector_class() -> Result<ClassHandle, KErrorType> {
    define(
        "Vector",
        Some(new_table(vec![
            (
                "new",
                new_function("Vector.new", |this, args| {
                    let this = this_instance(&this)?;
                    this.set("x", arg_or_nil(&args, 0))?;
                    this.set("y", arg_or_nil(&args, 1))?;
                    Ok(KValue::Nil)
                }),
            ),
            (
                "__add",
                new_function("Vector.__add", |this, args| {
                    let lhs = this_instance(&this)?;
                    let rhs = this_instance(&arg_or_nil(&args, 0))?;
                    let x = operators::arith(Operator::Add, &lhs.get("x"), &rhs.get("x"))?;
                    let y = operators::arith(Operator::Add, &lhs.get("y"), &rhs.get("y"))?;
                    match class_of(&this) {
                        Some(class) => call(&KValue::Class(class), vec![x, y]),
                        None => Ok(KValue::Nil),
                    }
                }),
            ),
        ])),
    )
}

fn vectors() -> Result<(), KErrorType> {
    info!("vector operators");
    let vector = vector_class()?;
    let a = call(&KValue::Class(vector.clone()), vec![KValue::from(1), KValue::from(2)])?;
    let b = call(&KValue::Class(vector.clone()), vec![KValue::from(3), KValue::from(4)])?;
    let sum = operators::arith(Operator::Add, &a, &b)?;
    let sum_instance = this_instance(&sum)?;
    println!(
        "{} + {} = {} ({}, {})",
        a,
        b,
        sum,
        sum_instance.get("x"),
        sum_instance.get("y")
    );

    // Added after a, b and sum exist.
    vector.set(
        "__eq",
        new_function("Vector.__eq", |this, args| {
            let lhs = this_instance(&this)?;
            let rhs = this_instance(&arg_or_nil(&args, 0))?;
            Ok(KValue::from(
                operators::equals(&lhs.get("x"), &rhs.get("x"))?
                    && operators::equals(&lhs.get("y"), &rhs.get("y"))?,
            ))
        }),
    )?;
    vector.set("__len", new_function("Vector.__len", |_, _| Ok(KValue::from(2))))?;

    let c = call(&KValue::Class(vector.clone()), vec![KValue::from(4), KValue::from(6)])?;
    println!("{} == {}: {}", sum, c, operators::equals(&sum, &c)?);
    println!("{} == {}: {}", a, b, operators::equals(&a, &b)?);
    println!("#{} = {}", a, operators::len(&a)?);
    Ok(())
}

fn errors() {
    info!("error kinds");
    let attempts: Vec<(&str, Result<(), KErrorType>)> = vec![
        (
            "redefine Animal",
            define("Animal", Some(new_table(vec![("sound", KValue::from("moo"))]))).map(|_| ()),
        ),
        ("define with a number", define("Broken", Some(KValue::from(42))).map(|_| ())),
        (
            "reassign super",
            define("Dog", None).and_then(|dog| dog.set("super", KValue::Nil)),
        ),
    ];
    for (label, result) in attempts {
        match result {
            Ok(()) => println!("{}: ok", label),
            Err(e) => println!("{}: {}", label, e),
        }
    }
}
