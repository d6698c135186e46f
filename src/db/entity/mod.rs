pub mod favorite_coin;
