use rand::distributions::Alphanumeric;
use rand::Rng;

const ROOM_ID_LENGTH: usize = 9;

/// Short shareable id for the room-select redirect.
pub fn generate() -> String {
  let mut rng = rand::thread_rng();
  (0..ROOM_ID_LENGTH)
    .map(|_| rng.sample(Alphanumeric) as char)
    .collect()
}
