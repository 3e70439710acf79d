//! Topics command implementation

use ecoquest::domain::TOPICS;

/// List the topic catalog
pub fn topics_command() {
    println!("Topics ({}):\n", TOPICS.len());
    for topic in TOPICS {
        println!("  {:>2}. {}", topic.id, topic.name);
        println!("      {}", topic.description);
    }
}
